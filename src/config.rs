//! Run configuration
//!
//! Loaded from `~/.subtrack/config.json` (or an explicit `--config` path) and
//! overridden field by field from the command line. A missing default config
//! file means defaults; a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::services::{AliasTable, UnknownEndDatePolicy, DEFAULT_TOP_N};
use crate::types::{Result, SubtrackError};

/// Default data document, relative to the working directory
const DEFAULT_DATA_PATH: &str = "data.js";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// On-disk configuration; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: Option<PathBuf>,
    /// `YYYY-MM-DD` (UTC midnight) or RFC 3339; unset means "now" at startup
    pub reference_date: Option<String>,
    /// Year assumed for `M月D日` end dates; unset means the reference date's year
    pub reference_year: Option<i32>,
    pub top_n: usize,
    pub unknown_end_date: UnknownEndDatePolicy,
    pub bind_addr: String,
    pub aliases: AliasTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            reference_date: None,
            reference_year: None,
            top_n: DEFAULT_TOP_N,
            unknown_end_date: UnknownEndDatePolicy::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            aliases: AliasTable::default(),
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub reference_date: Option<String>,
    pub reference_year: Option<i32>,
    pub top_n: Option<usize>,
    pub unknown_end_date: Option<UnknownEndDatePolicy>,
    pub bind_addr: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_path: PathBuf,
    pub reference_date: DateTime<Utc>,
    pub reference_year: i32,
    pub top_n: usize,
    pub unknown_end_date: UnknownEndDatePolicy,
    pub bind_addr: String,
    pub aliases: AliasTable,
}

impl Config {
    /// Default config location (`~/.subtrack/config.json`)
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| SubtrackError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".subtrack").join("config.json"))
    }

    /// Load from an explicit path (must exist) or the default path (optional)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SubtrackError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SubtrackError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply overrides and fill derived values. `now` is read once by the
    /// caller and only used when no reference date is configured.
    pub fn resolve(self, overrides: ConfigOverrides, now: DateTime<Utc>) -> Result<RunSettings> {
        let top_n = overrides.top_n.unwrap_or(self.top_n);
        if top_n == 0 {
            return Err(SubtrackError::Config("top_n must be at least 1".into()));
        }

        let reference_date = match overrides.reference_date.or(self.reference_date) {
            Some(raw) => parse_reference_date(&raw)?,
            None => now,
        };
        let reference_year = overrides
            .reference_year
            .or(self.reference_year)
            .unwrap_or_else(|| reference_date.year());

        Ok(RunSettings {
            data_path: overrides
                .data_path
                .or(self.data_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            reference_date,
            reference_year,
            top_n,
            unknown_end_date: overrides.unknown_end_date.unwrap_or(self.unknown_end_date),
            bind_addr: overrides.bind_addr.unwrap_or(self.bind_addr),
            aliases: self.aliases,
        })
    }
}

/// Parse a reference date: `YYYY-MM-DD` means UTC midnight, otherwise RFC 3339
pub fn parse_reference_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            SubtrackError::Parse(format!(
                "invalid reference date '{}' (expected YYYY-MM-DD or RFC 3339)",
                raw
            ))
        })
}
