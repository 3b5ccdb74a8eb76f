use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::pagination::Paginated;

/// Query parameters accepted by the client list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Optional free-form search string applied to the client list.
    pub search: Option<String>,
    /// Optional page number for pagination.
    pub page: Option<usize>,
}

/// Result payload returned by [`crate::services::client::list_clients`].
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    /// Total number of clients matching the filter.
    pub total: usize,
    /// Page of clients requested by the caller.
    pub clients: Paginated<Client>,
}

/// A dependent record the cascade delete could not remove.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrphanedRecord {
    pub kind: String,
    pub id: String,
    pub error: String,
}

/// Outcome of a client cascade delete. The client itself is gone; anything
/// listed in `orphans` survived both the delete and its retry.
#[derive(Debug, Default, Serialize)]
pub struct CascadeReport {
    pub deleted_serve_attempts: usize,
    pub deleted_cases: usize,
    pub deleted_documents: usize,
    pub orphans: Vec<OrphanedRecord>,
}
