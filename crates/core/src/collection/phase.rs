// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent acquire/release phases over collection members
//!
//! Every member call of a phase runs as its own tokio task and the phase
//! waits for all of them before classifying results. Member tasks are
//! detached rather than aborted, so dropping a phase never interrupts a
//! member half-way through its own acquire or release.

use crate::config::CollectionConfig;
use crate::error::{ErrorGroup, MemberFailure, Phase, ResourceError};
use crate::manager::{ResourceManager, SharedManager};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::Instrument;

/// A member together with its position in the collection
#[derive(Clone)]
struct Member {
    index: usize,
    manager: SharedManager,
}

impl Member {
    fn failure(&self, phase: Phase, error: ResourceError) -> MemberFailure {
        MemberFailure {
            index: self.index,
            name: self.manager.name().to_string(),
            phase,
            error,
        }
    }
}

fn indexed(managers: &[SharedManager]) -> Vec<Member> {
    managers
        .iter()
        .enumerate()
        .map(|(index, manager)| Member {
            index,
            manager: Arc::clone(manager),
        })
        .collect()
}

async fn invoke(manager: &dyn ResourceManager, phase: Phase) -> Result<(), ResourceError> {
    match phase {
        Phase::Acquire => manager.acquire_resources().await,
        Phase::Release => manager.release_resources().await,
        Phase::ReleaseOnError => manager.release_resources_on_error().await,
    }
}

/// Start `phase` on every member at once, then wait for all of them.
///
/// Outcomes come back in member order regardless of completion order.
async fn fan_out(
    members: Vec<Member>,
    phase: Phase,
) -> (Vec<Member>, Vec<MemberFailure>) {
    let handles: Vec<_> = members
        .iter()
        .map(|member| {
            let manager = Arc::clone(&member.manager);
            let span = tracing::debug_span!(
                "member",
                index = member.index,
                name = manager.name(),
                phase = %phase,
            );
            tokio::spawn(async move { invoke(manager.as_ref(), phase).await }.instrument(span))
        })
        .collect();

    let mut succeeded = Vec::with_capacity(members.len());
    let mut failures = Vec::new();
    for (member, handle) in members.into_iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ResourceError::Panicked(e.to_string())),
        };
        match result {
            Ok(()) => succeeded.push(member),
            Err(error) => {
                tracing::warn!(
                    index = member.index,
                    name = member.manager.name(),
                    %phase,
                    error = %error,
                    "member failed"
                );
                failures.push(member.failure(phase, error));
            }
        }
    }

    (succeeded, failures)
}

/// Release `members` concurrently, aggregating every failure
async fn release_members(members: Vec<Member>, phase: Phase) -> Result<(), ErrorGroup> {
    let (_, failures) = fan_out(members, phase).await;
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ErrorGroup::not_released(failures))
    }
}

/// Acquire every member; on any failure roll back the ones that succeeded
async fn acquire_members(members: Vec<Member>) -> Result<(), ErrorGroup> {
    let (acquired, failures) = fan_out(members, Phase::Acquire).await;
    if failures.is_empty() {
        return Ok(());
    }

    tracing::warn!(
        failed = failures.len(),
        rolling_back = acquired.len(),
        "acquire failed, rolling back"
    );

    let group = ErrorGroup::not_acquired(failures);
    match release_members(acquired, Phase::ReleaseOnError).await {
        Ok(()) => Err(group),
        Err(rollback) => {
            tracing::error!(error = %rollback, "rollback failed");
            Err(group.with_rollback(rollback))
        }
    }
}

/// Run the acquire phase from a detached supervisor.
///
/// If the caller stops waiting and every member ended up acquired, nobody
/// will ever release them, so the supervisor does it.
async fn supervised_acquire(members: Vec<Member>) -> Result<(), ErrorGroup> {
    let (tx, rx) = oneshot::channel();
    let supervisor = async move {
        let result = acquire_members(members.clone()).await;
        if let Err(Ok(())) = tx.send(result) {
            tracing::warn!("caller went away during acquire, releasing members");
            if let Err(group) = release_members(members, Phase::ReleaseOnError).await {
                tracing::error!(error = %group, "release after abandoned acquire failed");
            }
        }
    };
    tokio::spawn(supervisor.in_current_span());

    rx.await
        .unwrap_or_else(|_| Err(ErrorGroup::interrupted(Phase::Acquire)))
}

/// Acquire phase of a collection
pub(crate) async fn acquire(
    managers: &[SharedManager],
    config: &CollectionConfig,
) -> Result<(), ErrorGroup> {
    if managers.is_empty() {
        tracing::debug!(collection = %config.name, "no members to acquire");
        return Ok(());
    }

    let span = tracing::info_span!(
        "collection.acquire",
        collection = %config.name,
        members = managers.len(),
    );
    let members = indexed(managers);
    let supervise = config.supervise_acquire;

    async move {
        tracing::debug!(supervise, "starting");
        let start = Instant::now();
        let result = if supervise {
            supervised_acquire(members).await
        } else {
            acquire_members(members).await
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::info!(elapsed_ms, "acquired"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "acquire failed"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Release phase of a collection, on either the normal or the error path
pub(crate) async fn release(
    managers: &[SharedManager],
    config: &CollectionConfig,
    phase: Phase,
) -> Result<(), ErrorGroup> {
    if managers.is_empty() {
        tracing::debug!(collection = %config.name, "no members to release");
        return Ok(());
    }

    let span = tracing::info_span!(
        "collection.release",
        collection = %config.name,
        members = managers.len(),
        on_error = matches!(phase, Phase::ReleaseOnError),
    );
    let members = indexed(managers);

    async move {
        tracing::debug!("starting");
        let start = Instant::now();
        let result = release_members(members, phase).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::info!(elapsed_ms, "released"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "release failed"),
        }
        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
