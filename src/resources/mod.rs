// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource operations against the dynamic API, single and batched.

pub mod batch;
pub mod operator;

pub use batch::{apply_all, delete_all_at_path};
pub use operator::{
    apply, apply_with_expected_result, describe, dynamic_api, require_client, ExpectedResult,
    Operation,
};
