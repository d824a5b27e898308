// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use kubedog::{ClientSet, Config};

/// Run kubedog resource steps from the command line
#[derive(Parser, Debug)]
#[command(name = "kubedog", version, about)]
struct Cli {
    /// Directory manifests are resolved against
    #[arg(long, global = true)]
    files_path: Option<PathBuf>,

    /// Maximum polling attempts for wait commands
    #[arg(long, global = true)]
    waiter_tries: Option<u32>,

    /// Seconds between polling attempts
    #[arg(long, global = true)]
    waiter_interval: Option<u64>,

    /// Template arguments as a JSON object
    #[arg(long, global = true)]
    template_args: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, submit, update or delete the resources of a manifest
    Apply {
        operation: String,
        manifest: String,
        #[arg(long, default_value = "")]
        namespace: String,
        /// Apply every document of the manifest
        #[arg(long, conflicts_with = "expect")]
        multi: bool,
        /// Expected outcome: succeed or fail
        #[arg(long)]
        expect: Option<String>,
    },
    /// Wait until a resource is created or deleted
    Wait { manifest: String, state: String },
    /// Wait until a field matches a .path=value selector
    Converge { manifest: String, selector: String },
    /// Wait until a status condition has the given value
    Condition {
        manifest: String,
        condition_type: String,
        value: String,
    },
    /// Set a single field on the live resource
    SetField {
        manifest: String,
        field_path: String,
        value: String,
    },
    /// Delete every resource declared under the files path
    Cleanup,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match std::env::var("RUST_LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Load configuration, command line flags take precedence
    let mut config = Config::from_env()?;
    if let Some(files_path) = cli.files_path {
        config.files_path = files_path;
    }

    let mut steps = ClientSet::connect(config).await?;
    if let Some(tries) = cli.waiter_tries {
        steps = steps.with_waiter_tries(tries);
    }
    if let Some(secs) = cli.waiter_interval {
        steps = steps.with_waiter_interval(Duration::from_secs(secs));
    }
    if let Some(args) = cli.template_args {
        let args: serde_json::Value = serde_json::from_str(&args)?;
        steps = steps.with_template_arguments(&args)?;
    }

    match cli.command {
        Command::Apply {
            operation,
            manifest,
            namespace,
            multi,
            expect,
        } => match (multi, expect) {
            (true, _) => {
                steps
                    .multi_resource_operation_in_namespace(&operation, &manifest, &namespace)
                    .await?
            }
            (false, Some(expected)) => {
                steps
                    .resource_operation_with_result_in_namespace(
                        &operation, &manifest, &namespace, &expected,
                    )
                    .await?
            }
            (false, None) => {
                steps
                    .resource_operation_in_namespace(&operation, &manifest, &namespace)
                    .await?
            }
        },
        Command::Wait { manifest, state } => steps.resource_should_be(&manifest, &state).await?,
        Command::Converge { manifest, selector } => {
            steps
                .resource_should_converge_to_selector(&manifest, &selector)
                .await?
        }
        Command::Condition {
            manifest,
            condition_type,
            value,
        } => {
            steps
                .resource_condition_should_be(&manifest, &condition_type, &value)
                .await?
        }
        Command::SetField {
            manifest,
            field_path,
            value,
        } => {
            steps
                .update_resource_with_field(&manifest, &field_path, &value)
                .await?
        }
        Command::Cleanup => steps.delete_all_test_resources().await?,
    }

    info!("Step completed");
    Ok(())
}
