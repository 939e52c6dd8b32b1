use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ROW_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub row_limit: usize,
    pub notice_duration: Duration,
    /// Pause between the config upload and the first connect of a new data source.
    pub settle_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api_url: env::var("HBASE_BROWSER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            data_dir: env::var("HBASE_BROWSER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            row_limit: parse_var("HBASE_BROWSER_ROW_LIMIT", DEFAULT_ROW_LIMIT)?,
            notice_duration: Duration::from_millis(parse_var("HBASE_BROWSER_NOTICE_MS", 3000)?),
            settle_delay: Duration::from_millis(parse_var("HBASE_BROWSER_SETTLE_MS", 500)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            row_limit: DEFAULT_ROW_LIMIT,
            notice_duration: Duration::from_secs(3),
            settle_delay: Duration::from_millis(500),
        }
    }
}

fn default_data_dir() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".hbase-browser"))
        .unwrap_or_else(|_| PathBuf::from(".hbase-browser"))
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        _ => Ok(default),
    }
}
