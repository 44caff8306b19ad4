//! Dashboard configuration
//!
//! Loaded from an optional TOML file (`vitalwatch.toml` in the working
//! directory unless `--config` names another one) and then overridden by the
//! command line. Every key has a default matching the recordings the dashboard
//! was designed around, so running without any file works.

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::feed::{Backoff, ColumnRef, FeedKind, ReadMode, SourceSpec, TimeColumn};

pub const DEFAULT_CONFIG_FILE: &str = "vitalwatch.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between two acquisition polls.
    pub poll_interval_ms: u64,
    /// Delay between two refreshes of a panel.
    pub refresh_interval_ms: u64,
    /// Seconds of recording visible on a waveform panel.
    pub sweep_secs: f64,
    pub read_mode: ReadMode,
    pub retry: RetryConfig,
    pub waveform: SourceSpec,
    pub monitor: SourceSpec,
    pub channels: Channels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
}

/// Which recording column feeds which measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channels {
    pub pressure: ColumnRef,
    pub flow: ColumnRef,
    pub volume: ColumnRef,
    pub fio2: ColumnRef,
    pub spo2: ColumnRef,
    pub pulse: ColumnRef,
    pub leak: ColumnRef,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            refresh_interval_ms: 100,
            sweep_secs: 600.0,
            read_mode: ReadMode::default(),
            retry: RetryConfig::default(),
            waveform: SourceSpec::new("2__pressureandflow.xls", TimeColumn::Index(0)),
            monitor: SourceSpec::new("2__monitordata.xls", TimeColumn::Name("Time".into())),
            channels: Channels::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_ms: 100,
            max_ms: 5000,
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            pressure: ColumnRef::Index(1),
            flow: ColumnRef::Index(2),
            volume: ColumnRef::Index(3),
            fio2: "FiO2".into(),
            spo2: "SpO2".into(),
            pulse: "Pulse".into(),
            leak: "Leak".into(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `explicit` if given (it must exist), otherwise the default file if
    /// present, otherwise built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::info!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            log::info!("Loading configuration from {}", default_path.display());
            Self::load(&default_path)
        } else {
            log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the configuration for a parsed command line.
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let explicit = matches.get_one::<String>("config").map(PathBuf::from);
        let mut config = Self::load_or_default(explicit.as_deref())?;
        config.apply_args(matches);
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply_args(&mut self, matches: &ArgMatches) {
        if let Some(path) = matches.get_one::<String>("waveform-file") {
            self.waveform.path = PathBuf::from(path);
        }
        if let Some(path) = matches.get_one::<String>("monitor-file") {
            self.monitor.path = PathBuf::from(path);
        }
        if let Some(ms) = matches.get_one::<u64>("poll-interval") {
            self.poll_interval_ms = *ms;
        }
        if let Some(ms) = matches.get_one::<u64>("refresh-interval") {
            self.refresh_interval_ms = *ms;
        }
        if matches.get_flag("rescan") {
            self.read_mode = ReadMode::Rescan;
        }
    }

    pub fn source(&self, feed: FeedKind) -> &SourceSpec {
        match feed {
            FeedKind::Waveform => &self.waveform,
            FeedKind::Monitor => &self.monitor,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.retry.initial_ms.max(1)),
            Duration::from_millis(self.retry.max_ms),
        )
    }
}
