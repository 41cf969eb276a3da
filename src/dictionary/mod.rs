//! Dictionary term lookup
//!
//! Dictionaries are auxiliary term indices (taxonomy, Gene Ontology,
//! InterPro, Pfam, Enzyme, CDD) that resolve short ids to descriptive
//! terms. This module only consumes their lookup contract, [`TermIndex`];
//! building the indices happens elsewhere.
//!
//! A [`DictionaryHandle`] owns an opened index for a bounded scope and
//! hands out [`DictionaryResolver`]s borrowing it.

pub mod handle;
pub mod index;
pub mod resolver;

pub use handle::DictionaryHandle;
pub use index::{MemoryTermIndex, TermIndex, TsvTermIndex};
pub use resolver::{DictionaryResolver, UNKNOWN_TERM};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MirrorError;

/// Kind of dictionary a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DicoKind {
    Taxonomy,
    NcbiTaxonomy,
    GeneOntology,
    InterPro,
    Pfam,
    Enzyme,
    Cdd,
}

impl DicoKind {
    pub const ALL: [DicoKind; 7] = [
        DicoKind::Taxonomy,
        DicoKind::NcbiTaxonomy,
        DicoKind::GeneOntology,
        DicoKind::InterPro,
        DicoKind::Pfam,
        DicoKind::Enzyme,
        DicoKind::Cdd,
    ];

    /// Canonical name, also the stem of the dictionary's TSV file
    pub fn name(&self) -> &'static str {
        match self {
            DicoKind::Taxonomy => "taxonomy",
            DicoKind::NcbiTaxonomy => "ncbi_taxonomy",
            DicoKind::GeneOntology => "go",
            DicoKind::InterPro => "interpro",
            DicoKind::Pfam => "pfam",
            DicoKind::Enzyme => "enzyme",
            DicoKind::Cdd => "cdd",
        }
    }

    /// Whether terms form a lineage through their parents
    pub fn is_taxonomy(&self) -> bool {
        matches!(self, DicoKind::Taxonomy | DicoKind::NcbiTaxonomy)
    }
}

impl fmt::Display for DicoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DicoKind {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "taxonomy" | "tax" => Ok(DicoKind::Taxonomy),
            "ncbi_taxonomy" | "ncbitaxonomy" | "ncbi_tax" => Ok(DicoKind::NcbiTaxonomy),
            "go" | "gene_ontology" | "geneontology" => Ok(DicoKind::GeneOntology),
            "interpro" | "ipr" => Ok(DicoKind::InterPro),
            "pfam" => Ok(DicoKind::Pfam),
            "enzyme" | "ec" => Ok(DicoKind::Enzyme),
            "cdd" => Ok(DicoKind::Cdd),
            other => Err(MirrorError::Dictionary {
                msg: format!("Unknown dictionary kind: {}", other),
            }),
        }
    }
}

/// A resolved dictionary term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DicoTerm {
    pub id: String,
    /// Human-readable term
    pub data_field: String,
    pub kind: DicoKind,
    /// Parent term, for lineage-structured dictionaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl DicoTerm {
    pub fn new(kind: DicoKind, id: impl Into<String>, data_field: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_field: data_field.into(),
            kind,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}
