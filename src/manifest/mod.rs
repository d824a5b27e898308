// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest loading and templating.

pub mod loader;
pub mod template;

pub use loader::{load_resource, load_resources, Resource};
