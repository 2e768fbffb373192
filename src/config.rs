// src/config.rs

//! Scheduling configuration.
//!
//! This module provides configuration parsing from TOML, environment variable
//! overrides, and validation of the size-independent batch-geometry
//! invariants. The remaining invariant (dataset length divisible by the data
//! parallel size) depends on the dataset and is checked at scheduler
//! construction.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SchedulerError};

/// Batch geometry and seeding for one scheduler instance.
///
/// The fields are plain `u64` on the configuration surface; they are narrowed
/// into the scheduler's index type at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Number of data-parallel worker replicas.
    pub data_parallel_size: u64,
    /// Samples processed across all workers in one optimizer step.
    pub global_batch_size: u64,
    /// Samples per worker per forward/backward computation.
    pub micro_batch_size: u64,
    /// Base seed for epoch-keyed shuffling.
    pub seed: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            data_parallel_size: 1,
            global_batch_size: 1,
            micro_batch_size: 1,
            seed: 0,
        }
    }
}

impl FromStr for ScheduleConfig {
    type Err = SchedulerError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| SchedulerError::config_with_source("failed to parse TOML config", e))
    }
}

impl ScheduleConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read or parsed, or if the
    // parsed values violate the batch-geometry invariants.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::config_with_source(
                format!("failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `SCHED_`:
    // - `SCHED_DATA_PARALLEL_SIZE` overrides `data_parallel_size`
    // - `SCHED_GLOBAL_BATCH_SIZE` overrides `global_batch_size`
    // - `SCHED_MICRO_BATCH_SIZE` overrides `micro_batch_size`
    // - `SCHED_SEED` overrides `seed`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SCHED_DATA_PARALLEL_SIZE") {
            if let Ok(v) = val.parse() {
                self.data_parallel_size = v;
            }
        }
        if let Ok(val) = std::env::var("SCHED_GLOBAL_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.global_batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("SCHED_MICRO_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.micro_batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("SCHED_SEED") {
            if let Ok(v) = val.parse() {
                self.seed = v;
            }
        }
        self
    }

    // Validate the batch-geometry invariants.
    //
    // # Errors
    //
    // Returns an error if any invariant is violated.
    pub fn validate(&self) -> Result<()> {
        if self.data_parallel_size == 0 {
            return Err(SchedulerError::config(
                "data_parallel_size must be greater than 0",
            ));
        }
        if self.global_batch_size == 0 {
            return Err(SchedulerError::config(
                "global_batch_size must be greater than 0",
            ));
        }
        if self.micro_batch_size == 0 {
            return Err(SchedulerError::config(
                "micro_batch_size must be greater than 0",
            ));
        }
        if self.global_batch_size % self.data_parallel_size != 0 {
            return Err(SchedulerError::config(format!(
                "global_batch_size ({}) must be divisible by data_parallel_size ({})",
                self.global_batch_size, self.data_parallel_size
            )));
        }
        if (self.global_batch_size / self.data_parallel_size) % self.micro_batch_size != 0 {
            return Err(SchedulerError::config(format!(
                "per-worker batch ({}) must be an integral number of micro-batches of size {}",
                self.global_batch_size / self.data_parallel_size,
                self.micro_batch_size
            )));
        }
        Ok(())
    }
}
