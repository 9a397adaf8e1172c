//! JSON backup of the resume collection

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::error::BackupError;
use crate::model::{Resume, ResumeInput};
use crate::store::Store;

pub const BACKUP_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub resumes: Vec<Resume>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl Backup {
    /// Pretty-printed, as written to disk
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot every resume in the store
pub fn export_backup(store: &Store) -> Backup {
    Backup {
        resumes: store.resumes().to_vec(),
        exported_at: store.clock().now(),
        version: BACKUP_VERSION.to_string(),
    }
}

/// `resumes-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("resumes-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Insert every resume found in `json` as a new record.
///
/// Entries go through [`Store::add_resume`], so they receive fresh ids and
/// timestamps. The whole file is parsed before anything is inserted.
/// Returns the number of imported resumes. A failed write stops the import
/// with [`BackupError::Interrupted`], which counts the resumes already in
/// the store, including the one whose write failed.
pub fn import_backup(store: &mut Store, json: &str) -> Result<usize, BackupError> {
    let mut root: Value = serde_json::from_str(json)?;
    let resumes = match root.get_mut("resumes").map(Value::take) {
        Some(resumes @ Value::Array(_)) => resumes,
        _ => return Err(BackupError::InvalidFormat),
    };
    let inputs: Vec<ResumeInput> = serde_json::from_value(resumes)?;

    let count = inputs.len();
    for (done, input) in inputs.into_iter().enumerate() {
        if let Err(source) = store.add_resume(input) {
            let imported = done + usize::from(source.created_id().is_some());
            tracing::warn!(imported, error = %source, "backup import interrupted");
            return Err(BackupError::Interrupted { imported, source });
        }
    }
    tracing::info!(count, "imported resumes from backup");
    Ok(count)
}
