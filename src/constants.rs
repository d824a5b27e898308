// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Directory manifests are resolved against when no override is given
pub const DEFAULT_FILES_PATH: &str = "templates";

/// Separator between documents in a multi-resource manifest
pub const DOCUMENT_SEPARATOR: &str = "\n---";

/// File extensions considered manifests when walking a directory
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Waiter polling configuration
pub mod waiter {
    /// Maximum number of polling attempts
    pub const DEFAULT_TRIES: u32 = 40;
    /// Seconds to sleep between polling attempts
    pub const DEFAULT_INTERVAL_SECS: u64 = 30;
}

/// Environment variables read by `Config::from_env`
pub mod env {
    pub const FILES_PATH: &str = "KUBEDOG_FILES_PATH";
    pub const WAITER_TRIES: &str = "KUBEDOG_WAITER_TRIES";
    pub const WAITER_INTERVAL_SECS: &str = "KUBEDOG_WAITER_INTERVAL_SECS";
}
