use anyhow::Context;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub upload_path: String,
    pub data_dir: String,
    pub mapbox_token: Option<String>,
    pub geo_step_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        Ok(Config {
            database_url: env::var("DATABASE_URL").context("environment variable DATABASE_URL not been set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().unwrap_or(8000),
            jwt_secret: env::var("JWT_SECRET").context("environment variable JWT_SECRET not been set")?,
            upload_path: env::var("UPLOAD_PATH").unwrap_or_else(|_| "uploads".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| ".".to_string()),
            mapbox_token: env::var("MAPBOX_ACCESS_TOKEN").ok(),
            geo_step_timeout_secs: env::var("GEO_STEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        })
    }
}
