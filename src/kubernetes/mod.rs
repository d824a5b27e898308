// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for type discovery and schema-less object access.

pub mod discovery;
pub mod unstructured;

pub use discovery::{resolve_type, CachedDiscovery, TypeMapping};
