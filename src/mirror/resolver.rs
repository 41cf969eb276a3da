//! Locating entries across index partitions and reading their bytes

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::MirrorError;
use crate::mirror::index::{IndexEntry, IndexPartition};
use crate::mirror::reader_type::{resolve_reader_type, ReaderDescriptor, ReaderType};

/// Resolves sequence ids against an ordered list of index partitions
///
/// The resolver holds only read-only configuration, so one instance can
/// serve concurrent requests.
pub struct MirrorResolver {
    partitions: Vec<Box<dyn IndexPartition>>,
    descriptors: Vec<ReaderDescriptor>,
}

impl MirrorResolver {
    pub fn new(descriptors: Vec<ReaderDescriptor>) -> Self {
        Self {
            partitions: Vec::new(),
            descriptors,
        }
    }

    /// Append a partition; earlier partitions take precedence
    pub fn add_partition<P: IndexPartition + 'static>(&mut self, partition: P) {
        self.partitions.push(Box::new(partition));
    }

    pub fn with_partition<P: IndexPartition + 'static>(mut self, partition: P) -> Self {
        self.add_partition(partition);
        self
    }

    pub fn partitions(&self) -> impl Iterator<Item = &dyn IndexPartition> {
        self.partitions.iter().map(|p| p.as_ref())
    }

    pub fn descriptors(&self) -> &[ReaderDescriptor] {
        &self.descriptors
    }

    /// Find `id` in the first partition that holds it
    ///
    /// Partitions are searched in order and the first hit wins; entries are
    /// never merged across partitions.
    pub fn locate(&self, id: &str) -> Result<IndexEntry, MirrorError> {
        self.locate_where(id, |_| true)
    }

    /// Find `id` among the partitions stored under a mirror root
    pub fn locate_in_mirror(&self, id: &str, root: &Path) -> Result<IndexEntry, MirrorError> {
        self.locate_where(id, |p| p.path().starts_with(root))
    }

    fn locate_where<F>(&self, id: &str, filter: F) -> Result<IndexEntry, MirrorError>
    where
        F: Fn(&dyn IndexPartition) -> bool,
    {
        for partition in self.partitions().filter(|p| filter(*p)) {
            if let Some(entry) = partition.lookup(id)? {
                log::debug!(
                    "{} found in {} at [{}, {}]",
                    id,
                    partition.path().display(),
                    entry.start,
                    entry.end
                );
                return Ok(entry);
            }
        }
        Err(MirrorError::IdNotFound { id: id.to_string() })
    }

    /// Reader type declared for the partition an entry came from
    pub fn reader_type_for(&self, entry: &IndexEntry) -> Result<ReaderType, MirrorError> {
        resolve_reader_type(&entry.index_path, &self.descriptors)
    }

    /// Read the bytes `[start, end]` of an entry into a fresh buffer
    ///
    /// Any I/O failure, including a file shorter than the range, fails the
    /// whole read; no partial buffer is returned.
    pub fn extract_range(&self, entry: &IndexEntry) -> Result<Vec<u8>, MirrorError> {
        read_range(entry).map_err(|e| {
            log::warn!(
                "Unable to read {} from {} [{}, {}]: {}",
                entry.id,
                entry.file.display(),
                entry.start,
                entry.end,
                e
            );
            MirrorError::Retrieval {
                id: entry.id.clone(),
                file: entry.file.display().to_string(),
                start: entry.start,
                end: entry.end,
                msg: e.to_string(),
            }
        })
    }
}

fn read_range(entry: &IndexEntry) -> std::io::Result<Vec<u8>> {
    let len = entry.len().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid byte range")
    })?;
    let mut file = File::open(&entry.file)?;
    let file_len = file.metadata()?.len();
    if entry.end >= file_len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("range ends past end of file ({} bytes)", file_len),
        ));
    }

    file.seek(SeekFrom::Start(entry.start))?;
    let mut buffer = Vec::with_capacity(len as usize);
    file.take(len).read_to_end(&mut buffer)?;
    if buffer.len() as u64 != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "file shorter than indexed range",
        ));
    }
    Ok(buffer)
}
