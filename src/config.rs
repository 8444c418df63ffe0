use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use crate::constants::DEFAULT_DB_PATH;
use crate::error::AppError;

/// Validated startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) api_url: String,
    pub(crate) bearer_token: String,
    pub(crate) max_messages_per_day: u32,
    pub(crate) db_path: PathBuf,
}

/// Raw values from flags and environment; any of them may be missing.
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigSources {
    pub(crate) api_url: Option<String>,
    pub(crate) bearer_token: Option<String>,
    pub(crate) max_messages_per_day: Option<String>,
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) config_path: Option<PathBuf>,
}

/// Optional YAML file with the same settings. Flags and env win over it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    bearer_token: Option<String>,
    max_messages_per_day: Option<i64>,
    db_path: Option<PathBuf>,
}

impl Config {
    pub(crate) fn resolve(sources: ConfigSources) -> Result<Self, AppError> {
        let file = match &sources.config_path {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };

        let api_url = non_empty(sources.api_url)
            .or(non_empty(file.api_url))
            .ok_or_else(|| AppError::Config("collection endpoint URL is not set".into()))?;
        validate_url(&api_url)?;

        let bearer_token = non_empty(sources.bearer_token)
            .or(non_empty(file.bearer_token))
            .ok_or_else(|| AppError::Config("bearer token is not set".into()))?;

        let raw_cap = sources
            .max_messages_per_day
            .or(file.max_messages_per_day.map(|n| n.to_string()))
            .ok_or_else(|| AppError::Config("daily message cap is not set".into()))?;
        let max_messages_per_day = parse_cap(&raw_cap)?;

        let db_path = sources
            .db_path
            .or(file.db_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Ok(Self {
            api_url,
            bearer_token,
            max_messages_per_day,
            db_path,
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    Ok(serde_yaml::from_str(&text)?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_url(raw: &str) -> Result<(), AppError> {
    let url = Url::parse(raw).map_err(|e| AppError::Config(format!("invalid endpoint URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!("endpoint URL must be http or https, got {other}"))),
    }
}

/// The cap must be a positive integer; zero or garbage is a startup error
/// rather than an unbounded or zero-message quota.
pub(crate) fn parse_cap(raw: &str) -> Result<u32, AppError> {
    let cap: u32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("daily message cap must be a positive integer, got {raw:?}")))?;
    if cap == 0 {
        return Err(AppError::Config("daily message cap must be greater than zero".into()));
    }
    Ok(cap)
}
