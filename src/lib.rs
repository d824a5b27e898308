// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod manifest;
pub mod resources;
pub mod steps;
pub mod waiter;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Config, WaiterConfig};
pub use error::{KubedogError, Result};
pub use steps::ClientSet;
