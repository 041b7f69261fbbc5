//! File-backed fault record (`error.log` by default).

use std::path::{Path, PathBuf};

use crate::app::ports::{FaultRecordPort, StorageError};

pub struct FileFaultRecord {
    path: PathBuf,
}

impl FileFaultRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FaultRecordPort for FileFaultRecord {
    /// Truncates the file and writes `line` plus a terminator.
    fn persist(&mut self, line: &str) -> Result<(), StorageError> {
        std::fs::write(&self.path, format!("{line}\n")).map_err(StorageError::IoError)
    }
}
