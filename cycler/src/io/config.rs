//! Cycler configuration stored as `config.toml` in the session directory.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::timing::{MAX_MINUTES, MILLIS_PER_MINUTE};

/// Cycler configuration (TOML).
///
/// Missing fields default to the values the game is usually played with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CyclerConfig {
    pub delay: DelayConfig,
    pub auto_cycle: AutoCycleConfig,
}

/// Delay before each dispatched interaction, in whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DelayConfig {
    pub fast_secs: u64,
    pub slow_secs: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            fast_secs: 1,
            slow_secs: 4,
        }
    }
}

/// Watchdog cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutoCycleConfig {
    /// Lower bound of the randomized restart threshold.
    pub min_minutes: u64,
    /// Upper bound of the randomized restart threshold.
    pub max_minutes: u64,
    /// Interval between watchdog firings.
    pub poll_minutes: u64,
}

impl Default for AutoCycleConfig {
    fn default() -> Self {
        Self {
            min_minutes: 15,
            max_minutes: 45,
            poll_minutes: 5,
        }
    }
}

impl AutoCycleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_minutes.saturating_mul(MILLIS_PER_MINUTE))
    }
}

impl CyclerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.delay.fast_secs > self.delay.slow_secs {
            return Err(anyhow!(
                "delay.fast_secs ({}) must be <= delay.slow_secs ({})",
                self.delay.fast_secs,
                self.delay.slow_secs
            ));
        }
        if self.auto_cycle.max_minutes > MAX_MINUTES {
            return Err(anyhow!(
                "auto_cycle.max_minutes ({}) must be <= {}",
                self.auto_cycle.max_minutes,
                MAX_MINUTES
            ));
        }
        if self.auto_cycle.max_minutes == 0 {
            return Err(anyhow!("auto_cycle.max_minutes must be > 0"));
        }
        if self.auto_cycle.min_minutes > self.auto_cycle.max_minutes {
            return Err(anyhow!(
                "auto_cycle.min_minutes ({}) must be <= auto_cycle.max_minutes ({})",
                self.auto_cycle.min_minutes,
                self.auto_cycle.max_minutes
            ));
        }
        if self.auto_cycle.poll_minutes == 0 {
            return Err(anyhow!("auto_cycle.poll_minutes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CyclerConfig::default()`.
pub fn load_config(path: &Path) -> Result<CyclerConfig> {
    if !path.exists() {
        let cfg = CyclerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CyclerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CyclerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
