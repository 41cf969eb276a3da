//! Reader types and the descriptors that assign them to partitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::MirrorError;
use crate::record::RecordFormat;

/// Tag naming the entry grammar of an index partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderType {
    Blastp,
    Blastn,
    #[serde(rename = "genbank")]
    GenBank,
    #[serde(rename = "genpept")]
    GenPept,
    Embl,
    #[serde(rename = "uniprot")]
    UniProt,
}

impl ReaderType {
    pub const ALL: [ReaderType; 6] = [
        ReaderType::Blastp,
        ReaderType::Blastn,
        ReaderType::GenBank,
        ReaderType::GenPept,
        ReaderType::Embl,
        ReaderType::UniProt,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ReaderType::Blastp => "blastp",
            ReaderType::Blastn => "blastn",
            ReaderType::GenBank => "genbank",
            ReaderType::GenPept => "genpept",
            ReaderType::Embl => "embl",
            ReaderType::UniProt => "uniprot",
        }
    }

    /// Parser selected by this reader type
    pub fn record_format(&self) -> RecordFormat {
        match self {
            ReaderType::Blastp => RecordFormat::Fasta { protein: true },
            ReaderType::Blastn => RecordFormat::Fasta { protein: false },
            ReaderType::GenBank => RecordFormat::GenBank,
            ReaderType::GenPept => RecordFormat::GenPept,
            ReaderType::Embl => RecordFormat::Embl,
            ReaderType::UniProt => RecordFormat::UniProt,
        }
    }
}

impl fmt::Display for ReaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ReaderType {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ReaderType::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| MirrorError::UnknownReaderType {
                tag: tag.to_string(),
            })
    }
}

/// Assigns a reader type to every partition whose path starts with `path_prefix`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderDescriptor {
    pub path_prefix: String,
    pub reader_type: String,
}

impl ReaderDescriptor {
    pub fn new(path_prefix: impl Into<String>, reader_type: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            reader_type: reader_type.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        !self.path_prefix.is_empty() && path.starts_with(&self.path_prefix)
    }

    /// Match with the extension removed from both sides
    fn matches_stem(&self, stem: &str) -> bool {
        let prefix = Path::new(&self.path_prefix).with_extension("");
        let prefix = prefix.to_string_lossy();
        !prefix.is_empty() && stem.starts_with(&*prefix)
    }
}

/// Resolve the reader type declared for a partition path
///
/// The first descriptor whose prefix matches wins. When none matches, the
/// extensions are stripped from the path and the prefixes and the lookup is
/// retried, which covers FASTA partitions indexed under another suffix than
/// their BLAST alias file (`nr.ldx` for `nr.pal`). A matching
/// descriptor with an unknown tag is an error; so is no match at all.
pub fn resolve_reader_type(
    partition: &Path,
    descriptors: &[ReaderDescriptor],
) -> Result<ReaderType, MirrorError> {
    let path = partition.to_string_lossy();
    let stripped = partition.with_extension("");
    let stripped = stripped.to_string_lossy();

    let descriptor = descriptors
        .iter()
        .find(|d| d.matches(&path))
        .or_else(|| descriptors.iter().find(|d| d.matches_stem(&stripped)));

    match descriptor {
        Some(d) => d.reader_type.parse(),
        None => Err(MirrorError::UnknownReaderType {
            tag: format!("<no descriptor for {}>", path),
        }),
    }
}
