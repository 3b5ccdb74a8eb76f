//! Synchronization controller.
//!
//! Startup runs a reachability probe against the remote backend. A failed
//! probe leaves the session on the local mirror (`Disconnected`); only a
//! manual refresh re-probes. A successful probe triggers a full fetch of the
//! clients and serve attempts (`Syncing` → `Synced`), after which a fixed
//! interval timer repeats the same fetch. Every mechanism converges on one
//! action, "re-fetch everything and overwrite the snapshot", so overlapping
//! triggers are idempotent. A single-flight guard keeps fetches from piling
//! up, and a monotonic sequence number discards a late stale response instead
//! of letting it overwrite newer state. Fetch failures while `Synced` are
//! logged and swallowed; the state never regresses.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::{BackendResult, Collection, ListQuery, RemoteBackend};
use crate::domain::client::Client;
use crate::domain::serve_attempt::ServeAttempt;
use crate::normalize;
use crate::state::LocalState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Disconnected,
    Syncing,
    Synced,
}

/// What a single refresh pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Applied,
    /// Another fetch was already in flight.
    Skipped,
    /// The fetch completed after a newer one had already been applied.
    Stale,
    /// Still disconnected: the re-probe failed.
    Offline,
    Failed,
}

pub struct SyncController {
    backend: Arc<dyn RemoteBackend>,
    state: Arc<LocalState>,
    status: RwLock<SyncState>,
    last_synced: RwLock<Option<NaiveDateTime>>,
    seq: AtomicU64,
    applied: AtomicU64,
    in_flight: AtomicBool,
    poll_interval: Duration,
}

impl SyncController {
    pub fn new(
        backend: Arc<dyn RemoteBackend>,
        state: Arc<LocalState>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            backend,
            state,
            status: RwLock::new(SyncState::Disconnected),
            last_synced: RwLock::new(None),
            seq: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            poll_interval,
        }
    }

    pub fn status(&self) -> SyncState {
        *self
            .status
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn last_synced(&self) -> Option<NaiveDateTime> {
        *self
            .last_synced
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sequence number of the snapshot currently applied.
    pub fn applied_seq(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    /// Startup path: hydrate from the mirror, then try to reach the backend.
    pub async fn bootstrap(&self) {
        self.state.hydrate();
        match self.probe().await {
            Ok(()) => {
                self.set_status(SyncState::Syncing);
                self.refresh().await;
            }
            Err(e) => {
                warn!("Backend unreachable at startup, serving from local mirror: {e}");
            }
        }
    }

    /// Full fetch of both mirrored collections. The poll timer and the manual
    /// refresh endpoint both land here.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.status() == SyncState::Disconnected {
            // Only a manual refresh reaches this branch; the poll loop skips
            // disconnected sessions.
            if let Err(e) = self.probe().await {
                warn!("Backend still unreachable: {e}");
                return RefreshOutcome::Offline;
            }
            self.set_status(SyncState::Syncing);
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return RefreshOutcome::Skipped;
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let outcome = match self.fetch_all().await {
            Ok((clients, attempts)) => {
                if seq <= self.applied.load(Ordering::SeqCst) {
                    RefreshOutcome::Stale
                } else {
                    info!(
                        "Applying sync snapshot #{seq}: {} clients, {} serve attempts",
                        clients.len(),
                        attempts.len()
                    );
                    self.state.apply_snapshot(clients, attempts);
                    self.applied.store(seq, Ordering::SeqCst);
                    *self
                        .last_synced
                        .write()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()) =
                        Some(Utc::now().naive_utc());
                    self.set_status(SyncState::Synced);
                    RefreshOutcome::Applied
                }
            }
            Err(e) => {
                error!("Sync fetch failed: {e}");
                RefreshOutcome::Failed
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    /// Spawns the fixed-interval poll loop. Returns `None` when polling is
    /// disabled by configuration; callers keep the handle to abort the loop
    /// on teardown.
    pub fn spawn_polling(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.poll_interval.is_zero() {
            return None;
        }
        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(controller.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; bootstrap already fetched.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if controller.status() == SyncState::Disconnected {
                    continue;
                }
                controller.refresh().await;
            }
        }))
    }

    async fn probe(&self) -> BackendResult<()> {
        self.backend
            .list_documents(Collection::Clients, ListQuery::new().limit(1))
            .await
            .map(|_| ())
    }

    async fn fetch_all(&self) -> BackendResult<(Vec<Client>, Vec<ServeAttempt>)> {
        let clients = self
            .backend
            .list_documents(Collection::Clients, ListQuery::new())
            .await?;
        let attempts = self
            .backend
            .list_documents(Collection::ServeAttempts, ListQuery::new())
            .await?;
        Ok((
            normalize::normalize_clients(&clients),
            normalize::normalize_serve_attempts(&attempts),
        ))
    }

    fn set_status(&self, status: SyncState) {
        *self
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }
}
