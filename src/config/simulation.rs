//! Runtime settings for a village run, read from `config.toml`.
//!
//! Every key is optional. Unknown keys are rejected so a typo does not
//! silently fall back to a default.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::rules::Difficulty;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated weeks per wall-clock second.
    pub tick_rate_hz: f32,
    /// Weeks between automatic saves.
    pub snapshot_interval: u32,
    pub max_snapshots: u32,
    pub snapshot_directory: String,
    pub max_snapshot_bytes: u64,
    pub log_level: String,
    pub log_format: String,
    /// 0 picks a fresh seed per run.
    pub seed: u64,
    pub difficulty: Difficulty,
    /// Base URL of the narrative generator. Empty disables it.
    pub narrative_url: String,
    pub narrative_timeout_ms: u64,
    pub initial_event_batch: usize,
    pub replenish_event_batch: usize,
    pub bio_batch_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_rate_hz: 1.0,
            snapshot_interval: 20,
            max_snapshots: 10,
            snapshot_directory: "./snapshots".to_string(),
            max_snapshot_bytes: 5 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            seed: 0,
            difficulty: Difficulty::Normal,
            narrative_url: String::new(),
            narrative_timeout_ms: 5000,
            initial_event_batch: 8,
            replenish_event_batch: 5,
            bio_batch_size: 5,
        }
    }
}

fn positive(errors: &mut Vec<String>, key: &str, value: u64, example: u64) {
    if value == 0 {
        errors.push(format!("{} must be greater than 0. Example: {} = {}", key, key, example));
    }
}

fn one_of(errors: &mut Vec<String>, key: &str, value: &str, allowed: &[&str], example: &str) {
    if !allowed.contains(&value) {
        errors.push(format!(
            "{} must be one of {}, got '{}'. Example: {} = \"{}\"",
            key,
            allowed.join(", "),
            value,
            key,
            example
        ));
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&text, path)
    }

    /// Parse and validate. `origin` only labels error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, String> {
        let config: SimulationConfig = toml::from_str(text).map_err(|e| format!("{}: {}", origin.display(), e))?;
        config
            .validate()
            .map_err(|problems| format!("{} is invalid:\n{}", origin.display(), problems))?;
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    pub fn narrative_timeout(&self) -> Duration {
        Duration::from_millis(self.narrative_timeout_ms)
    }

    /// All problems at once, one per line.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !(self.tick_rate_hz > 0.0 && self.tick_rate_hz <= 1000.0) {
            errors.push(format!(
                "tick_rate_hz must be in (0, 1000], got {}. Example: tick_rate_hz = 1.0",
                self.tick_rate_hz
            ));
        }
        positive(&mut errors, "snapshot_interval", self.snapshot_interval as u64, 20);
        positive(&mut errors, "max_snapshots", self.max_snapshots as u64, 10);
        if self.max_snapshot_bytes < 1024 {
            errors.push(format!(
                "max_snapshot_bytes must be at least 1024, got {}. Example: max_snapshot_bytes = 5242880",
                self.max_snapshot_bytes
            ));
        }
        one_of(&mut errors, "log_level", &self.log_level, &LOG_LEVELS, "info");
        one_of(&mut errors, "log_format", &self.log_format, &LOG_FORMATS, "json");

        let url = self.narrative_url.as_str();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "narrative_url must start with http:// or https://, got '{}'. Example: narrative_url = \"http://127.0.0.1:3001\"",
                url
            ));
        }
        positive(&mut errors, "narrative_timeout_ms", self.narrative_timeout_ms, 5000);
        positive(&mut errors, "initial_event_batch", self.initial_event_batch as u64, 8);
        positive(&mut errors, "replenish_event_batch", self.replenish_event_batch as u64, 5);
        positive(&mut errors, "bio_batch_size", self.bio_batch_size as u64, 5);

        if errors.is_empty() { Ok(()) } else { Err(errors.join("\n")) }
    }
}
