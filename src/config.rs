use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Public origin used for canonical URLs and sitemap `loc` entries.
    pub site_url: String,
    pub site_name: String,
    /// Last-known-good sitemap artifact, served when regeneration fails.
    pub sitemap_path: PathBuf,
    pub public_rps: u32,
    pub admin_rps: u32,
    pub sweep_enabled: bool,
    pub sweep_retry_delay: Duration,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            site_url: get_env("SITE_URL")?.trim_end_matches('/').to_string(),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "HealthCare Jobs".to_string()),
            sitemap_path: env::var("SITEMAP_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public/sitemap.xml")),
            public_rps: get_env_parse("PUBLIC_RPS")?,
            admin_rps: get_env_parse("ADMIN_RPS")?,
            sweep_enabled: get_env_or("SWEEP_ENABLED", true)?,
            sweep_retry_delay: Duration::from_secs(get_env_or("SWEEP_RETRY_SECS", 3600)?),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
