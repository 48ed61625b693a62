use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ArcPath, ArcStr, log::LogLevel};

/// Options for path-based configuration values.
#[derive(Debug, Clone, Copy)]
pub enum PathOpt {
    /// Directory where log files are stored
    LogDir,
}

/// Options for string configuration values.
#[derive(Debug, Clone, Copy)]
pub enum StrOpt {
    /// Base URL of the blog platform API
    ApiUrl,
}

/// Options for numeric configuration values.
#[derive(Debug, Clone, Copy)]
pub enum U64Opt {
    /// Maximum age of log files in days before they are deleted
    LogMaxAgeDays,
    /// Seconds before a dispatched alert expires on its own
    AlertTtlSecs,
    /// Seconds an unsubscribed cache entry survives before eviction
    CacheGraceSecs,
    /// Timeout for network requests in seconds
    TimeoutSecs,
}

/// The configuration data structure that holds all configurable values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Data {
    /// Base URL of the blog platform API
    api_url: String,
    /// Directory where log files are stored
    log_dir: PathBuf,
    /// Current log level
    log_level: LogLevel,
    /// Maximum age of log files in days before they are deleted
    log_max_age_days: u64,
    /// Seconds before a dispatched alert expires
    alert_ttl_secs: u64,
    /// Seconds an unsubscribed cache entry survives before eviction
    cache_grace_secs: u64,
    /// Timeout for network requests in seconds
    timeout_secs: u64,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4000/api/v1".into(),
            log_dir: PathBuf::from("/tmp/quill/logs"),
            log_level: LogLevel::Warning,
            log_max_age_days: 0,
            alert_ttl_secs: 5,
            cache_grace_secs: 60,
            timeout_secs: 30,
        }
    }
}

impl Data {
    pub fn path(&self, opt: PathOpt) -> ArcPath {
        match opt {
            PathOpt::LogDir => ArcPath::from(self.log_dir.as_path()),
        }
    }

    pub fn set_path(&mut self, opt: PathOpt, path: ArcPath) {
        match opt {
            PathOpt::LogDir => self.log_dir = path.to_path_buf(),
        }
    }

    pub fn str(&self, opt: StrOpt) -> ArcStr {
        match opt {
            StrOpt::ApiUrl => ArcStr::from(self.api_url.as_str()),
        }
    }

    pub fn set_str(&mut self, opt: StrOpt, value: ArcStr) {
        match opt {
            StrOpt::ApiUrl => self.api_url = value.to_string(),
        }
    }

    pub fn u64(&self, opt: U64Opt) -> u64 {
        match opt {
            U64Opt::LogMaxAgeDays => self.log_max_age_days,
            U64Opt::AlertTtlSecs => self.alert_ttl_secs,
            U64Opt::CacheGraceSecs => self.cache_grace_secs,
            U64Opt::TimeoutSecs => self.timeout_secs,
        }
    }

    pub fn set_u64(&mut self, opt: U64Opt, value: u64) {
        match opt {
            U64Opt::LogMaxAgeDays => self.log_max_age_days = value,
            U64Opt::AlertTtlSecs => self.alert_ttl_secs = value,
            U64Opt::CacheGraceSecs => self.cache_grace_secs = value,
            U64Opt::TimeoutSecs => self.timeout_secs = value,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }
}
