//! Developer diagnostics.
//!
//! Compiled only with the `diagnostics` feature and reached through the
//! `servetracker-diag` binary; the service itself carries no debug hooks.

use serde::Serialize;

use crate::backend::{Collection, ListQuery, RemoteBackend};
use crate::mirror::{MirrorStats, MirrorStore};

#[derive(Debug, Serialize)]
pub struct DiagReport {
    pub backend_reachable: bool,
    pub backend_error: Option<String>,
    pub mirror: Option<MirrorStats>,
    pub mirror_error: Option<String>,
}

/// Probes the backend the same way the sync controller does at startup and
/// reads the mirrored row counts.
pub async fn collect(backend: &dyn RemoteBackend, mirror: &MirrorStore) -> DiagReport {
    let (backend_reachable, backend_error) = match backend
        .list_documents(Collection::Clients, ListQuery::new().limit(1))
        .await
    {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    let (mirror_stats, mirror_error) = match mirror.stats() {
        Ok(stats) => (Some(stats), None),
        Err(e) => (None, Some(e.to_string())),
    };

    DiagReport {
        backend_reachable,
        backend_error,
        mirror: mirror_stats,
        mirror_error,
    }
}
