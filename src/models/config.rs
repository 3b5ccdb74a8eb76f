//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// SQLite file holding the local mirror.
    pub database_url: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Seconds between background re-fetches; 0 disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Business address appended to every outbound notification.
    #[serde(default = "default_notify_address")]
    pub notify_address: String,
    pub backend: BackendConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend's REST API.
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    #[serde(default = "default_clients_collection")]
    pub clients_collection: String,
    #[serde(default = "default_cases_collection")]
    pub cases_collection: String,
    #[serde(default = "default_serves_collection")]
    pub serves_collection: String,
    #[serde(default = "default_documents_collection")]
    pub documents_collection: String,
    #[serde(default = "default_bucket_id")]
    pub bucket_id: String,
    #[serde(default = "default_email_function_id")]
    pub email_function_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_templates_dir() -> String {
    "templates/**/*.html".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_notify_address() -> String {
    "info@justlegalsolutions.org".to_string()
}

fn default_clients_collection() -> String {
    "clients".to_string()
}

fn default_cases_collection() -> String {
    "cases".to_string()
}

fn default_serves_collection() -> String {
    "serve_attempts".to_string()
}

fn default_documents_collection() -> String {
    "documents".to_string()
}

fn default_bucket_id() -> String {
    "client_documents".to_string()
}

fn default_email_function_id() -> String {
    "send_email".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
