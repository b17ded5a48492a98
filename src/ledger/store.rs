// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Append-only persistence for fee records.

use super::types::FeeRecord;
use crate::errors::{FeeEngineError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Durable or in-memory backing for the capture ledger.
///
/// `append` must either persist the whole record or return an error with
/// nothing persisted.
pub trait LedgerStore: Send + Sync {
    fn append(&self, record: &FeeRecord) -> Result<()>;

    /// All records in append order.
    fn load(&self) -> Result<Vec<FeeRecord>>;
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    records: Mutex<Vec<FeeRecord>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(&self, record: &FeeRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<FeeRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

/// One JSON document per line, appended and flushed per capture.
pub struct JsonLinesLedgerStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesLedgerStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                FeeEngineError::Storage(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| FeeEngineError::Storage(format!("cannot open {}: {}", path.display(), e)))?;

        info!("[LEDGER-STORE] Opened ledger file {}", path.display());

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonLinesLedgerStore {
    fn append(&self, record: &FeeRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| FeeEngineError::Storage(format!("cannot encode record: {}", e)))?;
        line.push('\n');

        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let committed_len = file
            .metadata()
            .map_err(|e| FeeEngineError::Storage(format!("cannot stat {}: {}", self.path.display(), e)))?
            .len();

        if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
            // Cut off whatever part of the line reached the file
            if let Err(truncate_err) = file.set_len(committed_len) {
                warn!(
                    "[LEDGER-STORE] Could not roll {} back to {} bytes: {}",
                    self.path.display(),
                    committed_len,
                    truncate_err
                );
            }
            return Err(FeeEngineError::Storage(format!(
                "write to {} failed: {}",
                self.path.display(),
                e
            )));
        }

        debug!(
            "[LEDGER-STORE] Appended record {:?} to {}",
            record.transaction_id,
            self.path.display()
        );
        Ok(())
    }

    /// Replays every complete line.
    ///
    /// A final line without its newline is an interrupted append: it is
    /// dropped and truncated away. A malformed line anywhere else is an error.
    fn load(&self) -> Result<Vec<FeeRecord>> {
        let file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| FeeEngineError::Storage(format!("cannot read {}: {}", self.path.display(), e)))?;

        let (complete, torn) = match content.rfind('\n') {
            Some(end) => content.split_at(end + 1),
            None => ("", content.as_str()),
        };

        if !torn.is_empty() {
            warn!(
                "[LEDGER-STORE] Dropping incomplete trailing record in {} ({} bytes)",
                self.path.display(),
                torn.len()
            );
            file.set_len(complete.len() as u64).map_err(|e| {
                FeeEngineError::Storage(format!("cannot truncate {}: {}", self.path.display(), e))
            })?;
        }

        let mut records = Vec::new();
        for (index, line) in complete.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: FeeRecord = serde_json::from_str(line).map_err(|e| {
                FeeEngineError::Storage(format!(
                    "{} line {}: {}",
                    self.path.display(),
                    index + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }
}
