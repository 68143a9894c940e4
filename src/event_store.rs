use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::{EventLog, RegistrationError, Result};

/// The `EventLogStore` trait defines how whole event logs are loaded and saved.
///
/// Saving is guarded by optimistic concurrency: an implementation must refuse to save a log whose
/// `version` differs from the stored one with [`RegistrationError::Concurrency`], and must
/// bump the stored version on success. That conflict is the only error a caller should retry.
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Loads the current log of a conference. A conference without history yields an empty log.
    async fn load(&self, conference_id: Uuid) -> Result<EventLog>;

    async fn save(&mut self, log: &EventLog) -> Result<()>;
}

/// Keeps the persisted JSON form of each log in memory. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryEventLogStore {
    logs: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl InMemoryEventLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(conference_id: Uuid) -> RegistrationError {
    RegistrationError::StoreOperation {
        conference_id,
        source: anyhow!("event log storage lock poisoned"),
    }
}

#[async_trait]
impl EventLogStore for InMemoryEventLogStore {
    async fn load(&self, conference_id: Uuid) -> Result<EventLog> {
        let logs = self.logs.read().map_err(|_| poisoned(conference_id))?;

        match logs.get(&conference_id) {
            Some(json) => EventLog::from_json(json),
            None => Ok(EventLog::new(conference_id)),
        }
    }

    async fn save(&mut self, log: &EventLog) -> Result<()> {
        let conference_id = log.conference_id;
        let mut logs = self.logs.write().map_err(|_| poisoned(conference_id))?;

        let current = match logs.get(&conference_id) {
            Some(json) => EventLog::from_json(json)?.version,
            None => 0,
        };

        if current != log.version {
            return Err(RegistrationError::Concurrency {
                conference_id,
                expected: log.version,
                actual: current,
            });
        }

        let mut saved = log.clone();
        saved.version = current + 1;
        logs.insert(conference_id, saved.to_json()?);
        debug!(%conference_id, version = saved.version, "event log saved");

        Ok(())
    }
}
