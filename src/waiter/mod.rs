// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Convergence polling.

pub mod poller;
pub mod predicate;

pub use poller::{poll_until, wait_for};
pub use predicate::{FieldSelector, Outcome, Predicate};
