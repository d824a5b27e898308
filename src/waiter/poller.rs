// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling loop shared by every convergence step

use crate::config::WaiterConfig;
use crate::error::{KubedogError, Result};
use crate::waiter::predicate::{Outcome, Predicate};
use kube::{core::DynamicObject, Api};
use std::future::Future;
use tokio::time::sleep;
use tracing::{info, instrument};

/// Fetch until the predicate matches, at most `tries` times with `interval`
/// between attempts. No sleep follows the final attempt.
pub async fn poll_until<F, Fut>(
    waiter: &WaiterConfig,
    target: &str,
    predicate: &Predicate,
    mut fetch: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<DynamicObject, kube::Error>>,
{
    let tries = waiter.tries();

    for attempt in 1..=tries {
        match predicate.evaluate(fetch().await)? {
            Outcome::Matched => {
                info!("{} is {}", target, predicate);
                return Ok(());
            }
            Outcome::Pending => {
                info!(
                    "Waiting for {} to be {} (attempt {}/{})",
                    target, predicate, attempt, tries
                );
            }
        }

        if attempt < tries {
            sleep(waiter.interval()).await;
        }
    }

    Err(KubedogError::WaiterTimedOut {
        resource: target.to_string(),
        target: predicate.to_string(),
        tries,
    })
}

/// Poll a named object through a dynamic API handle
#[instrument(skip(api, waiter, predicate), fields(predicate = %predicate))]
pub async fn wait_for(
    api: &Api<DynamicObject>,
    name: &str,
    target: &str,
    waiter: &WaiterConfig,
    predicate: &Predicate,
) -> Result<()> {
    poll_until(waiter, target, predicate, || api.get(name)).await
}
