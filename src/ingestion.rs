use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReceiptHistoryError, Result};

/// A source file that could not be read. Recorded in the run report; the
/// rest of the batch still processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Reads one corpus file whole (receipt corpora are small text files).
pub fn read_corpus(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ReceiptHistoryError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a batch of corpus files, partitioning successes from failures.
pub fn read_corpora(paths: &[PathBuf]) -> (Vec<(PathBuf, String)>, Vec<FailedFile>) {
    let mut loaded = Vec::new();
    let mut failed = Vec::new();

    for path in paths {
        match read_corpus(path) {
            Ok(corpus) => loaded.push((path.clone(), corpus)),
            Err(error) => {
                warn!("Skipping unreadable receipt file {}: {}", path.display(), error);
                failed.push(FailedFile {
                    path: path.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    (loaded, failed)
}
