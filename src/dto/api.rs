use chrono::NaiveDateTime;
use serde::Serialize;

use crate::sync::{RefreshOutcome, SyncState};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Current view of the synchronization controller.
#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub state: SyncState,
    pub last_synced_at: Option<NaiveDateTime>,
    pub applied_seq: u64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub outcome: RefreshOutcome,
}
