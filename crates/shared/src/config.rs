use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub status_interval: Duration,
    pub empty_check_interval: Duration,
    pub collect_followup: Duration,
    pub news_hours: u32,
    pub news_limit: u32,
}

impl Config {
    /// Configuration for `api_url` with the dashboard's stock timings.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            status_interval: Duration::from_secs(10),
            empty_check_interval: Duration::from_secs(30),
            collect_followup: Duration::from_secs(30),
            news_hours: 24,
            news_limit: 20,
        }
    }

    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let raw_url = env::var("RADAR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url).with_context(|| {
            format!(
                "RADAR_API_URL is not a valid URL: {}\n\n\
                Set it in ~/.config/radar-dashboard/.env, e.g.:\n  \
                RADAR_API_URL=http://127.0.0.1:5000",
                raw_url
            )
        })?;
        let defaults = Self::new(api_url);

        Ok(Self {
            status_interval: secs_var("RADAR_STATUS_INTERVAL_SECS", defaults.status_interval)?,
            empty_check_interval: secs_var("RADAR_EMPTY_CHECK_SECS", defaults.empty_check_interval)?,
            collect_followup: secs_var("RADAR_COLLECT_FOLLOWUP_SECS", defaults.collect_followup)?,
            news_hours: number_var("RADAR_NEWS_HOURS", defaults.news_hours)?,
            news_limit: number_var("RADAR_NEWS_LIMIT", defaults.news_limit)?,
            ..defaults
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/radar-dashboard/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("radar-dashboard").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn number_var(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(raw) => parse_number(name, &raw),
        Err(_) => Ok(default),
    }
}

fn secs_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => parse_number(name, &raw).map(|secs| Duration::from_secs(secs as u64)),
        Err(_) => Ok(default),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u32> {
    let value: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer, got {:?}", name, raw))?;
    if value == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}
