//! In-memory snapshot of the mirrored collections.
//!
//! This is what list views read. Every mutation writes through to the
//! persistent mirror; a mirror write failure is logged and otherwise ignored,
//! the snapshot stays authoritative for the running session.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::error;

use crate::domain::client::Client;
use crate::domain::serve_attempt::ServeAttempt;
use crate::mirror::MirrorStore;

pub struct LocalState {
    clients: RwLock<Vec<Client>>,
    attempts: RwLock<Vec<ServeAttempt>>,
    mirror: MirrorStore,
}

impl LocalState {
    pub fn new(mirror: MirrorStore) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            attempts: RwLock::new(Vec::new()),
            mirror,
        }
    }

    /// Loads the last persisted collections, used once at startup and as the
    /// offline fallback.
    pub fn hydrate(&self) {
        match self.mirror.load_clients() {
            Ok(clients) => *write(&self.clients) = clients,
            Err(e) => error!("Failed to read clients from mirror: {e}"),
        }
        match self.mirror.load_serve_attempts() {
            Ok(attempts) => *write(&self.attempts) = attempts,
            Err(e) => error!("Failed to read serve attempts from mirror: {e}"),
        }
    }

    /// Replaces both collections with a freshly fetched snapshot.
    pub fn apply_snapshot(&self, clients: Vec<Client>, attempts: Vec<ServeAttempt>) {
        self.persist_clients(&clients);
        self.persist_attempts(&attempts);
        *write(&self.clients) = clients;
        *write(&self.attempts) = attempts;
    }

    pub fn clients(&self) -> Vec<Client> {
        read(&self.clients).clone()
    }

    pub fn serve_attempts(&self) -> Vec<ServeAttempt> {
        read(&self.attempts).clone()
    }

    pub fn find_client(&self, id: &str) -> Option<Client> {
        read(&self.clients).iter().find(|c| c.id == id).cloned()
    }

    pub fn find_attempt(&self, id: &str) -> Option<ServeAttempt> {
        read(&self.attempts).iter().find(|a| a.id == id).cloned()
    }

    pub fn upsert_client(&self, client: Client) {
        let mut clients = write(&self.clients);
        match clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client,
            None => clients.push(client),
        }
        self.persist_clients(&clients);
    }

    /// Removes a client and every serve attempt recorded under it.
    pub fn remove_client(&self, id: &str) {
        let mut clients = write(&self.clients);
        clients.retain(|c| c.id != id);
        self.persist_clients(&clients);
        drop(clients);

        let mut attempts = write(&self.attempts);
        attempts.retain(|a| a.client_id != id);
        self.persist_attempts(&attempts);
    }

    pub fn upsert_attempt(&self, attempt: ServeAttempt) {
        let mut attempts = write(&self.attempts);
        match attempts.iter_mut().find(|a| a.id == attempt.id) {
            Some(existing) => *existing = attempt,
            None => attempts.push(attempt),
        }
        self.persist_attempts(&attempts);
    }

    pub fn remove_attempt(&self, id: &str) {
        let mut attempts = write(&self.attempts);
        attempts.retain(|a| a.id != id);
        self.persist_attempts(&attempts);
    }

    fn persist_clients(&self, clients: &[Client]) {
        if let Err(e) = self.mirror.store_clients(clients) {
            error!("Failed to persist clients to mirror: {e}");
        }
    }

    fn persist_attempts(&self, attempts: &[ServeAttempt]) {
        if let Err(e) = self.mirror.store_serve_attempts(attempts) {
            error!("Failed to persist serve attempts to mirror: {e}");
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
