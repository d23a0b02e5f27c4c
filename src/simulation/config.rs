use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Fixed model constants and experiment settings shared by the runner and the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Initiation cost at the first station.
    pub init_time: f64,
    /// Static processing time at the relay.
    pub static_time: f64,
    /// Client link capacity (Kbps).
    pub client_bandwidth: f64,
    /// Buffer size (KB).
    pub buffer_size: f64,
    /// Mean file size (KB).
    pub file_size: f64,
    pub warmup: f64,
    pub main_duration: f64,
    pub cooldown: f64,
    /// Probability level handed to the Student-t quantile.
    pub precision: f64,
    pub trials: u32,
    pub sweep_start: u32,
    pub sweep_end: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            init_time: 0.001,
            static_time: 0.0001,
            client_bandwidth: 707.0,
            buffer_size: 16.0,
            file_size: 42.2,
            warmup: 10.0,
            main_duration: 40.0,
            cooldown: 10.0,
            precision: 0.8,
            trials: 10,
            sweep_start: 10,
            sweep_end: 40,
        }
    }
}

impl ModelConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_sweep(mut self, start: u32, end: u32) -> Self {
        self.sweep_start = start;
        self.sweep_end = end;
        self
    }

    pub fn with_windows(mut self, warmup: f64, main_duration: f64, cooldown: f64) -> Self {
        self.warmup = warmup;
        self.main_duration = main_duration;
        self.cooldown = cooldown;
        self
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Total simulated time of one trial.
    pub fn horizon(&self) -> f64 {
        self.warmup + self.main_duration + self.cooldown
    }

    /// Open interval of arrival dates counted in the statistics.
    pub fn observation_window(&self) -> (f64, f64) {
        (self.warmup, self.warmup + self.main_duration)
    }

    pub fn sweep(&self) -> RangeInclusive<u32> {
        self.sweep_start..=self.sweep_end
    }

    pub fn sweep_len(&self) -> usize {
        self.sweep().count()
    }

    /// Probability of looping back to the relay after a buffer is sent (1 - B/F).
    pub fn reroute_probability(&self) -> f64 {
        1.0 - self.buffer_size / self.file_size
    }

    pub fn validate(&self) -> Result<()> {
        let positives = [
            ("init_time", self.init_time),
            ("static_time", self.static_time),
            ("client_bandwidth", self.client_bandwidth),
            ("buffer_size", self.buffer_size),
            ("file_size", self.file_size),
            ("main_duration", self.main_duration),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                bail!("{} must be a positive number, got {}", name, value);
            }
        }
        if !(self.warmup >= 0.0 && self.cooldown >= 0.0) {
            bail!("warmup and cooldown must be non-negative");
        }
        if self.buffer_size > self.file_size {
            bail!(
                "buffer_size ({}) cannot exceed file_size ({})",
                self.buffer_size,
                self.file_size
            );
        }
        // Below 0.5 the t quantile is negative and the bounds swap.
        if !(self.precision > 0.5 && self.precision < 1.0) {
            bail!("precision must lie in (0.5, 1), got {}", self.precision);
        }
        if self.trials == 0 {
            bail!("at least one trial is required");
        }
        if self.sweep_start == 0 || self.sweep_start > self.sweep_end {
            bail!(
                "invalid arrival-rate sweep {}..={}",
                self.sweep_start,
                self.sweep_end
            );
        }
        Ok(())
    }
}
