use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::cleaner::EvictionPolicy;
use crate::pattern::{PatternError, WildcardPattern};
use crate::utils;

pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("scan_interval_minutes must be greater than zero")]
    ZeroInterval,
    #[error("monitor_paths[{0}] has an empty path")]
    EmptyPath(usize),
    #[error("monitor path {}: {source}", path.display())]
    InvalidPattern {
        path: PathBuf,
        source: PatternError,
    },
}

/// Retention rule for one watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub path: PathBuf,
    pub max_files_count: u64,
    pub min_file_age_hours: u64,
    /// `None` matches every entry.
    pub wildcard_pattern: Option<String>,
}

impl MonitorConfig {
    pub fn policy(&self) -> EvictionPolicy {
        EvictionPolicy {
            max_files_count: self.max_files_count,
            min_file_age_hours: self.min_file_age_hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scan_interval_minutes: u64,
    pub monitors: Vec<MonitorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            monitors: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_interval")]
    scan_interval_minutes: u64,
    #[serde(default)]
    monitor_paths: Vec<RawMonitor>,
}

#[derive(Debug, Deserialize)]
struct RawMonitor {
    path: String,
    max_files_count: u64,
    min_file_age_hours: u64,
    #[serde(default)]
    wildcard_pattern: Option<String>,
}

fn default_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_MINUTES
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;

        info!(
            "Config loaded successfully. Monitor paths: {}, Scan interval: {} minutes.",
            config.monitors.len(),
            config.scan_interval_minutes
        );
        Ok(config)
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        if raw.scan_interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let mut monitors = Vec::with_capacity(raw.monitor_paths.len());
        for (idx, m) in raw.monitor_paths.into_iter().enumerate() {
            if m.path.trim().is_empty() {
                return Err(ConfigError::EmptyPath(idx));
            }
            let path = utils::expand_home(&m.path);
            let wildcard_pattern = m.wildcard_pattern.filter(|p| !p.is_empty());
            if let Some(p) = &wildcard_pattern {
                WildcardPattern::compile(p).map_err(|source| ConfigError::InvalidPattern {
                    path: path.clone(),
                    source,
                })?;
            }
            monitors.push(MonitorConfig {
                path,
                max_files_count: m.max_files_count,
                min_file_age_hours: m.min_file_age_hours,
                wildcard_pattern,
            });
        }

        Ok(Self {
            scan_interval_minutes: raw.scan_interval_minutes,
            monitors,
        })
    }
}
