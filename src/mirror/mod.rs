//! Local mirror store.
//!
//! Persistent cache of the client and serve-attempt collections, held as JSON
//! arrays under two fixed keys in a SQLite table. The mirror is written on
//! every successful fetch and every successful local mutation, read once at
//! startup, and is always a lossy copy: the remote wins whenever reachable.

use chrono::Utc;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::db::{DbPool, get_connection};
use crate::domain::client::Client;
use crate::domain::serve_attempt::ServeAttempt;
use crate::models::mirror::MirrorEntry;

pub mod errors;

pub use errors::{RepositoryError, RepositoryResult};

pub const CLIENTS_KEY: &str = "servetracker.clients";
pub const SERVE_ATTEMPTS_KEY: &str = "servetracker.serve_attempts";

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Creates the mirror table if this is a fresh database file.
pub fn run_migrations(pool: &DbPool) -> RepositoryResult<()> {
    let mut conn = get_connection(pool)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| RepositoryError::Unexpected(e.to_string()))?;
    Ok(())
}

/// Row counts per mirrored collection, for diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MirrorStats {
    pub clients: usize,
    pub serve_attempts: usize,
}

#[derive(Clone)]
pub struct MirrorStore {
    pool: DbPool,
}

impl MirrorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn load_clients(&self) -> RepositoryResult<Vec<Client>> {
        self.read_key(CLIENTS_KEY)
    }

    pub fn store_clients(&self, clients: &[Client]) -> RepositoryResult<()> {
        self.write_key(CLIENTS_KEY, clients)
    }

    pub fn load_serve_attempts(&self) -> RepositoryResult<Vec<ServeAttempt>> {
        self.read_key(SERVE_ATTEMPTS_KEY)
    }

    pub fn store_serve_attempts(&self, attempts: &[ServeAttempt]) -> RepositoryResult<()> {
        self.write_key(SERVE_ATTEMPTS_KEY, attempts)
    }

    pub fn stats(&self) -> RepositoryResult<MirrorStats> {
        Ok(MirrorStats {
            clients: self.load_clients()?.len(),
            serve_attempts: self.load_serve_attempts()?.len(),
        })
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> RepositoryResult<Vec<T>> {
        use crate::schema::mirror_entries;

        let mut conn = get_connection(&self.pool)?;
        let payload = mirror_entries::table
            .find(key)
            .select(mirror_entries::payload)
            .first::<String>(&mut conn)
            .optional()?;

        match payload {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_key<T: Serialize>(&self, key: &str, items: &[T]) -> RepositoryResult<()> {
        use crate::schema::mirror_entries;

        let entry = MirrorEntry {
            key: key.to_string(),
            payload: serde_json::to_string(items)?,
            updated_at: Utc::now().naive_utc(),
        };

        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(mirror_entries::table)
            .values(&entry)
            .execute(&mut conn)?;
        Ok(())
    }
}
