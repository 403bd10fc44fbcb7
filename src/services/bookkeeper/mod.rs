//! Rotation bookkeeping.
//!
//! After a page is served, the profiles on it get a `last_shown_at`
//! stamp. The write is fire-and-forget, runs in fixed-size chunks, and
//! is throttled: a profile already stamped inside the current rotation
//! window is skipped, so page reloads do not amplify writes. A lost or
//! failed stamp never affects ranking correctness, so store failures are
//! logged and dropped.

use crate::config::EngineConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RotationStore: Send + Sync {
    /// Current `last_shown_at` for each id that has one.
    async fn last_shown_batch(
        &self,
        ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, DateTime<Utc>>>;

    /// Persist `last_shown_at = now` for the given ids.
    async fn mark_shown_batch(&self, ids: &[Uuid], now: DateTime<Utc>) -> anyhow::Result<()>;
}

/// Map-backed store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryRotationStore {
    marks: DashMap<Uuid, DateTime<Utc>>,
}

impl InMemoryRotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_shown(&self, id: &Uuid) -> Option<DateTime<Utc>> {
        self.marks.get(id).map(|entry| *entry.value())
    }
}

#[async_trait]
impl RotationStore for InMemoryRotationStore {
    async fn last_shown_batch(
        &self,
        ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, DateTime<Utc>>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.marks.get(id).map(|entry| (*id, *entry.value())))
            .collect())
    }

    async fn mark_shown_batch(&self, ids: &[Uuid], now: DateTime<Utc>) -> anyhow::Result<()> {
        for id in ids {
            self.marks.insert(*id, now);
        }
        Ok(())
    }
}

pub struct RotationBookkeeper {
    store: Arc<dyn RotationStore>,
    config: EngineConfig,
}

impl RotationBookkeeper {
    pub fn new(store: Arc<dyn RotationStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Stamp the served profiles without blocking the response that
    /// triggered it. Safe to call multiple times for the same page.
    pub fn mark_shown(&self, profile_ids: Vec<Uuid>, now: DateTime<Utc>) {
        if profile_ids.is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        tokio::spawn(async move {
            let stamped = run_mark_shown(store, &config, profile_ids, now).await;
            debug!(stamped, "rotation bookkeeping pass complete");
        });
    }

    /// Awaitable variant for batch jobs and tests. Returns how many
    /// profiles were actually stamped after throttling.
    pub async fn mark_shown_sync(&self, profile_ids: Vec<Uuid>, now: DateTime<Utc>) -> usize {
        run_mark_shown(Arc::clone(&self.store), &self.config, profile_ids, now).await
    }
}

async fn run_mark_shown(
    store: Arc<dyn RotationStore>,
    config: &EngineConfig,
    profile_ids: Vec<Uuid>,
    now: DateTime<Utc>,
) -> usize {
    let window_start = now - config.rotation_interval();
    let chunk_size = config.bookkeeper_chunk_size.max(1);
    let mut stamped = 0;

    for chunk in profile_ids.chunks(chunk_size) {
        let existing = match store.last_shown_batch(chunk).await {
            Ok(existing) => existing,
            Err(error) => {
                warn!(%error, "rotation store read failed, chunk skipped");
                continue;
            }
        };

        // Only stamp ids that are unset or stamped before the current
        // window, keeping one write per window per profile.
        let due: Vec<Uuid> = chunk
            .iter()
            .copied()
            .filter(|id| match existing.get(id) {
                Some(last) => *last <= window_start,
                None => true,
            })
            .collect();

        if due.is_empty() {
            continue;
        }

        match store.mark_shown_batch(&due, now).await {
            Ok(()) => stamped += due.len(),
            Err(error) => {
                warn!(%error, "rotation store write failed, chunk dropped");
            }
        }
    }

    stamped
}
