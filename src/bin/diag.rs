//! Operational diagnostics for a deployed ServeTracker instance.
//!
//! Prints backend reachability and mirror row counts as JSON. Pass
//! `--refresh` to also force a full fetch into the mirror.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use config::Config;
use dotenvy::dotenv;

use servetracker::backend::{HttpBackend, RemoteBackend};
use servetracker::db::establish_connection_pool;
use servetracker::diag;
use servetracker::mirror::{self, MirrorStore};
use servetracker::models::config::ServerConfig;
use servetracker::state::LocalState;
use servetracker::sync::SyncController;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {}", err);
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = mirror::run_migrations(&pool) {
        log::error!("Failed to prepare mirror database: {e}");
        std::process::exit(1);
    }
    let mirror_store = MirrorStore::new(pool);

    let backend = match HttpBackend::new(server_config.backend.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            log::error!("Invalid backend configuration: {e}");
            std::process::exit(1);
        }
    };

    let report = diag::collect(&backend, &mirror_store).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("report serializes")
    );

    if env::args().any(|arg| arg == "--refresh") {
        let backend: Arc<dyn RemoteBackend> = Arc::new(backend);
        let state = Arc::new(LocalState::new(mirror_store));
        state.hydrate();
        let controller = SyncController::new(backend, state, Duration::ZERO);
        let outcome = controller.refresh().await;
        println!(
            "{}",
            serde_json::json!({"refresh": outcome, "state": controller.status()})
        );
    }
}
