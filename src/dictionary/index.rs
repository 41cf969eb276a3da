//! Term index backends

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::dictionary::{DicoKind, DicoTerm};
use crate::error::MirrorError;

/// Read-only lookup contract of a dictionary store
pub trait TermIndex: Send + Sync {
    /// Exact lookup by id
    fn get(&self, kind: DicoKind, id: &str) -> Result<Option<DicoTerm>, MirrorError>;

    /// Name search, best matches first
    ///
    /// Matching is case-insensitive. Exact names rank before prefixes,
    /// prefixes before substrings; ties go to the shorter term.
    fn search(&self, kind: DicoKind, name: &str, limit: usize)
        -> Result<Vec<DicoTerm>, MirrorError>;
}

/// Rank of `term` for `query` (already lowercased); `None` when unrelated
fn match_rank(term: &str, query: &str) -> Option<u8> {
    let term = term.to_lowercase();
    if term == query {
        Some(0)
    } else if term.starts_with(query) {
        Some(1)
    } else if term.contains(query) {
        Some(2)
    } else {
        None
    }
}

/// Dictionary terms held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTermIndex {
    terms: HashMap<DicoKind, BTreeMap<String, DicoTerm>>,
}

impl MemoryTermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: DicoTerm) {
        self.terms
            .entry(term.kind)
            .or_default()
            .insert(term.id.clone(), term);
    }

    /// Number of terms of a kind
    pub fn count(&self, kind: DicoKind) -> usize {
        self.terms.get(&kind).map_or(0, BTreeMap::len)
    }

    /// A small index with a few terms of every kind
    pub fn with_test_data() -> Self {
        let mut index = Self::new();
        let taxonomy = [
            ("1", "root", "1"),
            ("131567", "cellular organisms", "1"),
            ("2759", "Eukaryota", "131567"),
            ("40674", "Mammalia", "2759"),
            ("9605", "Homo", "40674"),
            ("9606", "Homo sapiens", "9605"),
            ("10088", "Mus", "40674"),
            ("10090", "Mus musculus", "10088"),
        ];
        for (id, name, parent) in taxonomy {
            index.insert(DicoTerm::new(DicoKind::Taxonomy, id, name).with_parent(parent));
        }
        for (kind, id, name) in [
            (DicoKind::GeneOntology, "GO:0005634", "nucleus"),
            (DicoKind::GeneOntology, "GO:0008150", "biological_process"),
            (DicoKind::InterPro, "IPR000001", "Kringle"),
            (DicoKind::Pfam, "PF00001", "7 transmembrane receptor (rhodopsin family)"),
            (DicoKind::Enzyme, "1.1.1.1", "alcohol dehydrogenase"),
            (DicoKind::Cdd, "cd00001", "PTS_IIB_man"),
        ] {
            index.insert(DicoTerm::new(kind, id, name));
        }
        index
    }
}

impl TermIndex for MemoryTermIndex {
    fn get(&self, kind: DicoKind, id: &str) -> Result<Option<DicoTerm>, MirrorError> {
        Ok(self.terms.get(&kind).and_then(|t| t.get(id)).cloned())
    }

    fn search(
        &self,
        kind: DicoKind,
        name: &str,
        limit: usize,
    ) -> Result<Vec<DicoTerm>, MirrorError> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let Some(terms) = self.terms.get(&kind) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(u8, &DicoTerm)> = terms
            .values()
            .filter_map(|t| match_rank(&t.data_field, &query).map(|rank| (rank, t)))
            .collect();
        hits.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then(a.data_field.len().cmp(&b.data_field.len()))
                .then(a.id.cmp(&b.id))
        });

        Ok(hits.into_iter().take(limit).map(|(_, t)| t.clone()).collect())
    }
}

/// Dictionaries read from tab-separated files
///
/// Each line holds `id<TAB>term[<TAB>parent]`. [`TsvTermIndex::open`] reads
/// every `<kind>.tsv` present in a directory (`taxonomy.tsv`, `go.tsv`, ...).
#[derive(Debug, Clone, Default)]
pub struct TsvTermIndex {
    sources: Vec<PathBuf>,
    terms: MemoryTermIndex,
}

impl TsvTermIndex {
    /// Load the dictionaries found in `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory or a dictionary file
    /// cannot be read.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, MirrorError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MirrorError::Dictionary {
                msg: format!("Dictionary directory not found: {}", dir.display()),
            });
        }

        let mut index = Self::default();
        for kind in DicoKind::ALL {
            let path = dir.join(format!("{}.tsv", kind.name()));
            if path.is_file() {
                index.load_file(kind, &path)?;
            }
        }
        Ok(index)
    }

    /// Load one dictionary file of the given kind
    pub fn load_file<P: AsRef<Path>>(&mut self, kind: DicoKind, path: P) -> Result<usize, MirrorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MirrorError::Dictionary {
            msg: format!("Failed to open {}: {}", path.display(), e),
        })?;

        let mut loaded = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| MirrorError::Dictionary {
                msg: format!("Failed to read {}: {}", path.display(), e),
            })?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(id), Some(data)) = (fields.next(), fields.next()) else {
                log::debug!("{}: skipping line without term: {}", path.display(), line);
                continue;
            };
            let mut term = DicoTerm::new(kind, id.trim(), data.trim());
            if let Some(parent) = fields.next().map(str::trim).filter(|p| !p.is_empty()) {
                term = term.with_parent(parent);
            }
            self.terms.insert(term);
            loaded += 1;
        }

        log::debug!("Loaded {} {} terms from {}", loaded, kind, path.display());
        self.sources.push(path.to_path_buf());
        Ok(loaded)
    }

    /// Files loaded so far
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

impl TermIndex for TsvTermIndex {
    fn get(&self, kind: DicoKind, id: &str) -> Result<Option<DicoTerm>, MirrorError> {
        self.terms.get(kind, id)
    }

    fn search(
        &self,
        kind: DicoKind,
        name: &str,
        limit: usize,
    ) -> Result<Vec<DicoTerm>, MirrorError> {
        self.terms.search(kind, name, limit)
    }
}
