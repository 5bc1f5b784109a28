//! Key → identity lookup table.
//!
//! # Responsibilities
//! - Parse the line-oriented `key|identity` source
//! - Answer lookups from concurrent request handlers
//!
//! # Design Decisions
//! - Built once before serving, immutable afterwards (shared via Arc, no locks)
//! - The first line without a delimiter ends loading. Later lines are
//!   discarded even when well formed.
//! - An unreadable source yields an empty table; every request then fails
//!   authorization instead of the process refusing to start

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separates key from identity on each source line.
pub const DELIMITER: char = '|';

/// Errors raised while opening the identity source.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Unable to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable snapshot of every known key.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    entries: HashMap<String, String>,
}

impl IdentityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse entries from a reader.
    ///
    /// Stops at the first empty line, the first line lacking [`DELIMITER`],
    /// or the first read error. Everything parsed up to that point is kept.
    pub fn from_reader<R: BufRead>(mut reader: R, verbose: bool) -> Self {
        let mut entries = HashMap::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Identity source read failed, stopping");
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                break;
            }

            let Some((key, identity)) = line.split_once(DELIMITER) else {
                tracing::debug!(loaded = entries.len(), "Line without delimiter, stopping");
                break;
            };

            if verbose {
                tracing::debug!("{} => {}", key, identity);
            }
            entries.insert(key.to_string(), identity.to_string());
        }

        Self { entries }
    }

    /// Open and parse the identity file at `path`.
    pub fn open(path: &Path, verbose: bool) -> Result<Self, IdentityError> {
        let file = File::open(path).map_err(|source| IdentityError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Loading keys from {}", path.display());
        let table = Self::from_reader(BufReader::new(file), verbose);
        tracing::info!(count = table.len(), "Loaded {} users", table.len());
        Ok(table)
    }

    /// Load the identity file, falling back to an empty table when it cannot
    /// be opened. The failure is only logged.
    pub fn load(path: &Path, verbose: bool) -> Self {
        match Self::open(path, verbose) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "Identity source unavailable, starting with no users");
                Self::new()
            }
        }
    }

    /// Resolve a key to its identity.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for IdentityTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
