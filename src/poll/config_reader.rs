use crate::poll::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "data/votes.json";
pub const DEFAULT_KV_KEY: &str = "mammoth-votes";
pub const DEFAULT_KV_TIMEOUT_MS: u64 = 5000;

pub const KV_URL_VAR: &str = "KV_REST_API_URL";
pub const KV_TOKEN_VAR: &str = "KV_REST_API_TOKEN";
pub const DATA_FILE_VAR: &str = "POLL_DATA_FILE";
pub const KV_KEY_VAR: &str = "POLL_KV_KEY";

/// The optional configuration file. The credentials of the key-value store
/// are deliberately absent: they only come from the environment.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(rename = "dataFile")]
    pub data_file: Option<String>,
    #[serde(rename = "kvKey")]
    pub kv_key: Option<String>,
    #[serde(rename = "kvTimeoutMs")]
    pub kv_timeout_ms: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct KvSettings {
    pub url: String,
    pub token: String,
    pub key: String,
    pub timeout: Duration,
}

/// Where the ballots are stored, once all the configuration sources are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    /// Set when both credentials are present. They are not checked here.
    pub kv: Option<KvSettings>,
}

impl StoreConfig {
    /// Merges the sources, by decreasing priority: the `--data-file` flag, the
    /// environment, the configuration file and the defaults.
    ///
    /// `env` looks up an environment variable. Empty values count as missing.
    pub fn resolve<F>(file: &PollConfig, data_file_flag: Option<&str>, env: F) -> StoreConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let data_file = data_file_flag
            .map(|s| s.to_string())
            .or_else(|| lookup(DATA_FILE_VAR))
            .or_else(|| file.data_file.clone())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

        let kv = match (lookup(KV_URL_VAR), lookup(KV_TOKEN_VAR)) {
            (Some(url), Some(token)) => Some(KvSettings {
                url,
                token,
                key: lookup(KV_KEY_VAR)
                    .or_else(|| file.kv_key.clone())
                    .unwrap_or_else(|| DEFAULT_KV_KEY.to_string()),
                timeout: Duration::from_millis(
                    file.kv_timeout_ms.unwrap_or(DEFAULT_KV_TIMEOUT_MS),
                ),
            }),
            _ => None,
        };

        StoreConfig {
            kv,
            ..StoreConfig::file_only(&data_file)
        }
    }

    pub fn from_env(file: &PollConfig, data_file_flag: Option<&str>) -> StoreConfig {
        StoreConfig::resolve(file, data_file_flag, |k| std::env::var(k).ok())
    }

    pub fn file_only(path: &str) -> StoreConfig {
        StoreConfig {
            data_file: PathBuf::from(path),
            kv: None,
        }
    }
}

pub fn read_config(path: &str) -> StoreResult<PollConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: PollConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> StoreResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}
