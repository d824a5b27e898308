// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as keys, waiter, DEFAULT_FILES_PATH};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Bounded polling configuration shared by every convergence step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterConfig {
    tries: u32,
    interval: Duration,
}

impl WaiterConfig {
    /// Zero or missing values fall back to the defaults
    pub fn new(tries: Option<u32>, interval: Option<Duration>) -> Self {
        Self {
            tries: tries
                .filter(|t| *t > 0)
                .unwrap_or(waiter::DEFAULT_TRIES),
            interval: interval
                .filter(|i| !i.is_zero())
                .unwrap_or(Duration::from_secs(waiter::DEFAULT_INTERVAL_SECS)),
        }
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Step library configuration, set by the embedding test harness
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory manifest names are resolved against
    pub files_path: PathBuf,
    pub waiter: WaiterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files_path: PathBuf::from(DEFAULT_FILES_PATH),
            waiter: WaiterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let files_path = lookup(keys::FILES_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_PATH));

        let tries = lookup(keys::WAITER_TRIES)
            .map(|v| {
                v.parse::<u32>().with_context(|| {
                    format!(
                        "{} must be a positive integer, got '{}'",
                        keys::WAITER_TRIES,
                        v
                    )
                })
            })
            .transpose()?;

        let interval = lookup(keys::WAITER_INTERVAL_SECS)
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| {
                        format!(
                            "{} must be a number of seconds, got '{}'",
                            keys::WAITER_INTERVAL_SECS,
                            v
                        )
                    })
            })
            .transpose()?;

        Ok(Config {
            files_path,
            waiter: WaiterConfig::new(tries, interval),
        })
    }
}
