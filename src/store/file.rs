// JSON file backing for terminal submission records

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use super::StoreError;
use crate::wizard::session::{SubmissionRecord, UserId};

/// One JSON document holding every terminal record, rewritten atomically
/// (temp file + rename) on each flush.
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> Result<HashMap<UserId, SubmissionRecord>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let records = serde_json::from_slice(&bytes)?;
                Ok(records)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no record file yet, starting empty");
                Ok(HashMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(
        &self,
        records: &HashMap<UserId, SubmissionRecord>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(
            path = %self.path.display(),
            records = records.len(),
            "record file flushed"
        );
        Ok(())
    }
}
