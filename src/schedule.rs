use chrono::NaiveDateTime;

use crate::entities::show;

/// A set of shows split around a single evaluation instant.
#[derive(Debug, Default)]
pub struct ShowPartition {
    pub past: Vec<show::Model>,
    pub upcoming: Vec<show::Model>,
}

impl ShowPartition {
    pub fn past_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }
}

/// Splits `shows` into past and upcoming relative to `now`.
///
/// A show starting exactly at `now` counts as upcoming, so every show lands
/// in exactly one bucket. `now` is supplied by the caller; this function
/// never reads the wall clock.
pub fn partition_shows(shows: Vec<show::Model>, now: NaiveDateTime) -> ShowPartition {
    let mut partition = ShowPartition::default();
    for show in shows {
        if show.start_time < now {
            partition.past.push(show);
        } else {
            partition.upcoming.push(show);
        }
    }
    partition
}
