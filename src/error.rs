// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubedogError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to {action} {resource}: {source}")]
    Api {
        action: String,
        resource: String,
        #[source]
        source: kube::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation '{0}', expected one of create, submit, update, delete")]
    UnsupportedOperation(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to decode document {document} of {}: {message}", path.display())]
    Decode {
        path: PathBuf,
        document: usize,
        message: String,
    },

    #[error("Failed to resolve type {gvk}: {source}")]
    TypeResolution {
        gvk: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid selector '{0}', expected .path.to.field=value")]
    InvalidSelector(String),

    #[error("Invalid field {path}: {message}")]
    InvalidField { path: String, message: String },

    #[error("waiter timed out waiting for {resource} to be {target} after {tries} attempts")]
    WaiterTimedOut {
        resource: String,
        target: String,
        tries: u32,
    },

    #[error("Expected {operation} of {resource} to {expected}, but it {actual}")]
    UnexpectedResult {
        operation: String,
        resource: String,
        expected: String,
        actual: String,
    },
}

impl KubedogError {
    /// Whether this wraps an API response with the given HTTP status code
    pub fn is_api_status(&self, status: u16) -> bool {
        match self {
            KubedogError::KubeError(e) | KubedogError::Api { source: e, .. } => {
                is_status(e, status)
            }
            _ => false,
        }
    }
}

/// Check if a kube error is an API error with the given status code
pub fn is_status(error: &kube::Error, status: u16) -> bool {
    matches!(error, kube::Error::Api(err) if err.code == status)
}

pub fn is_not_found(error: &kube::Error) -> bool {
    is_status(error, 404)
}

pub fn is_already_exists(error: &kube::Error) -> bool {
    is_status(error, 409)
}

pub type Result<T> = std::result::Result<T, KubedogError>;
