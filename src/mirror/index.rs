//! Index partitions mapping sequence ids to byte ranges

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::MirrorError;

/// Location of one entry inside a mirrored flat file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    /// Flat file holding the entry
    pub file: PathBuf,
    /// First byte of the entry, 0-based
    pub start: u64,
    /// Last byte of the entry, inclusive
    pub end: u64,
    /// Partition the entry was found in
    pub index_path: PathBuf,
}

impl IndexEntry {
    /// Number of bytes in `[start, end]`; `None` when the range is
    /// inverted or spans the whole `u64` domain
    pub fn len(&self) -> Option<u64> {
        self.end.checked_sub(self.start)?.checked_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// A read-only id index covering part of a mirror
pub trait IndexPartition: Send + Sync {
    /// Path identifying the partition; reader types are resolved from it
    fn path(&self) -> &Path;

    /// Look an id up; `Ok(None)` when the partition does not hold it
    fn lookup(&self, id: &str) -> Result<Option<IndexEntry>, MirrorError>;
}

/// Index partition read from a tab-separated file
///
/// Each line holds `id<TAB>file<TAB>start<TAB>end`; relative file paths are
/// resolved against the index's directory and `#` starts a comment line.
#[derive(Debug, Clone)]
pub struct TsvIndexPartition {
    path: PathBuf,
    entries: HashMap<String, (PathBuf, u64, u64)>,
}

impl TsvIndexPartition {
    /// Load an index file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line has a
    /// malformed byte offset.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MirrorError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| MirrorError::Io {
            msg: format!("Failed to open index {}: {}", path.display(), e),
        })?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut entries = HashMap::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| MirrorError::Io {
                msg: format!("Failed to read index {}: {}", path.display(), e),
            })?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                log::warn!(
                    "{}:{}: skipping index line with {} fields",
                    path.display(),
                    n + 1,
                    fields.len()
                );
                continue;
            }

            let offset = |field: &str, what: &str| {
                field.trim().parse::<u64>().map_err(|_| MirrorError::Io {
                    msg: format!(
                        "{}:{}: invalid {} offset '{}' for {}",
                        path.display(),
                        n + 1,
                        what,
                        field,
                        fields[0]
                    ),
                })
            };
            let start = offset(fields[2], "start")?;
            let end = offset(fields[3], "end")?;

            let file = PathBuf::from(fields[1]);
            let file = if file.is_relative() {
                base.join(file)
            } else {
                file
            };
            entries.insert(fields[0].to_string(), (file, start, end));
        }

        log::debug!("Loaded {} entries from index {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IndexPartition for TsvIndexPartition {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, id: &str) -> Result<Option<IndexEntry>, MirrorError> {
        Ok(self.entries.get(id).map(|(file, start, end)| IndexEntry {
            id: id.to_string(),
            file: file.clone(),
            start: *start,
            end: *end,
            index_path: self.path.clone(),
        }))
    }
}

/// In-memory partition for tests and embedding applications
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexPartition {
    path: PathBuf,
    entries: HashMap<String, IndexEntry>,
}

impl MemoryIndexPartition {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    /// Register an entry for `id`
    pub fn insert(&mut self, id: impl Into<String>, file: impl Into<PathBuf>, start: u64, end: u64) {
        let id = id.into();
        self.entries.insert(
            id.clone(),
            IndexEntry {
                id,
                file: file.into(),
                start,
                end,
                index_path: self.path.clone(),
            },
        );
    }
}

impl IndexPartition for MemoryIndexPartition {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, id: &str) -> Result<Option<IndexEntry>, MirrorError> {
        Ok(self.entries.get(id).cloned())
    }
}
