use serde::{Deserialize, Serialize};

/// Filters accepted by the serve-attempt list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ServesQuery {
    pub client_id: Option<String>,
    pub case_number: Option<String>,
}

/// Query parameters accepted by the per-client document list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentsQuery {
    pub case_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentUrlResponse {
    pub url: String,
}
