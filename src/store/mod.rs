// Session store - owns all per-user wizard state
//
// In-progress sessions live in memory only; terminal submission records are
// flushed write-through on every terminal transition, so a restart loses at
// most the session that was mid-flight.

mod file;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::wizard::session::{SubmissionRecord, UserId, WizardSession};
use file::RecordFile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, WizardSession>>,
    records: tokio::sync::Mutex<HashMap<UserId, SubmissionRecord>>,
    file: RecordFile,
}

impl SessionStore {
    /// Open the store, loading every terminal record from disk.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let file = RecordFile::new(path);
        let records = file.load().await?;
        info!(records = records.len(), "session store opened");
        Ok(Self {
            sessions: Mutex::new(HashMap::new()),
            records: tokio::sync::Mutex::new(records),
            file,
        })
    }

    /// Clone out the in-progress session for a user, if any. The caller
    /// mutates the clone within one event's scope and puts it back.
    pub fn session(&self, user: UserId) -> Option<WizardSession> {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .get(&user)
            .cloned()
    }

    pub fn put_session(&self, session: WizardSession) {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .insert(session.user_id, session);
    }

    pub fn remove_session(&self, user: UserId) {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .remove(&user);
    }

    pub async fn record(&self, user: UserId) -> Option<SubmissionRecord> {
        self.records.lock().await.get(&user).cloned()
    }

    /// Upsert a terminal record and flush the whole file write-through.
    /// The lock is held across the write so flushes never interleave. On a
    /// flush failure the map is rolled back so memory never claims a record
    /// the disk does not have.
    pub async fn write_record(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        let user = record.user_id;
        let mut records = self.records.lock().await;
        let previous = records.insert(user, record);
        if let Err(e) = self.file.save(&records).await {
            match previous {
                Some(prev) => records.insert(user, prev),
                None => records.remove(&user),
            };
            return Err(e);
        }
        Ok(())
    }

    pub async fn records_snapshot(&self) -> Vec<SubmissionRecord> {
        let mut records: Vec<_> = self.records.lock().await.values().cloned().collect();
        records.sort_by_key(|r| r.submit_time);
        records
    }
}
