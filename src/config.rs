use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_PATH: &str = "kjv.json";
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/thiagobodruk/bible/raw/master/json/kjv.json";
pub const DEFAULT_USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; kjv-reader/", env!("CARGO_PKG_VERSION"), ")");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReaderConfig {
    pub snapshot_path: PathBuf,
    pub source_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub log_dir: PathBuf,
    pub keep_logs: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            log_dir: PathBuf::from("logs"),
            keep_logs: 10,
        }
    }
}

impl ReaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
