use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // .env is a development convenience; absence is fine in production
        let _ = dotenvy::dotenv();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

        Ok(Self {
            database_url,
            rust_log,
            listen_addr,
        })
    }
}
