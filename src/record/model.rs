//! Sequence record model
//!
//! A [`SequenceRecord`] is built fresh for every extraction request and
//! handed to the caller for rendering; nothing here is cached or shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::{feature_span, FeatureLocation, Strand};

/// Placeholder for text fields absent from an entry
pub const NOT_SPECIFIED: &str = "?";
/// Placeholder for dates absent from an entry
pub const DATE_NOT_SPECIFIED: u32 = 0;
/// Qualifier carrying the textual form of a feature's location
pub const LOCATION_QUALIFIER: &str = "Location";

/// Broad molecule class of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeKind {
    Proteic,
    Nucleic,
}

impl MoleculeKind {
    pub fn is_protein(&self) -> bool {
        matches!(self, MoleculeKind::Proteic)
    }
}

impl fmt::Display for MoleculeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeKind::Proteic => write!(f, "proteic"),
            MoleculeKind::Nucleic => write!(f, "nucleic"),
        }
    }
}

/// Identification metadata of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    pub id: String,
    pub description: String,
    pub molecule_kind: MoleculeKind,
    /// Molecule type as written in the entry (`mRNA`, `DNA`, `aa`, ...)
    pub molecule_type: String,
    pub topology: String,
    pub division: String,
    /// `YYYYMMDD`, or [`DATE_NOT_SPECIFIED`]
    pub creation_date: u32,
    /// `YYYYMMDD`, or [`DATE_NOT_SPECIFIED`]
    pub update_date: u32,
    pub organism: String,
    /// Lineage, `;`-joined
    pub taxonomy: String,
    pub length: u64,
}

impl SequenceInfo {
    /// Create an info block with every optional field set to its placeholder
    pub fn new(id: impl Into<String>, molecule_kind: MoleculeKind) -> Self {
        Self {
            id: id.into(),
            description: NOT_SPECIFIED.to_string(),
            molecule_kind,
            molecule_type: NOT_SPECIFIED.to_string(),
            topology: NOT_SPECIFIED.to_string(),
            division: NOT_SPECIFIED.to_string(),
            creation_date: DATE_NOT_SPECIFIED,
            update_date: DATE_NOT_SPECIFIED,
            organism: NOT_SPECIFIED.to_string(),
            taxonomy: NOT_SPECIFIED.to_string(),
            length: 0,
        }
    }

    /// Take creation/update dates as the min/max of the dates found
    pub fn set_dates(&mut self, dates: &[u32]) {
        let known = dates.iter().copied().filter(|&d| d != DATE_NOT_SPECIFIED);
        let (min, max) = known.fold((None, None), |(lo, hi): (Option<u32>, Option<u32>), d| {
            (
                Some(lo.map_or(d, |lo| lo.min(d))),
                Some(hi.map_or(d, |hi| hi.max(d))),
            )
        });
        if let (Some(min), Some(max)) = (min, max) {
            self.creation_date = min;
            self.update_date = max;
        }
    }
}

/// A named qualifier value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub name: String,
    pub value: String,
}

/// An annotated region of a sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub key: String,
    /// First base; negative when the feature extends beyond the window
    pub from: i64,
    /// Last base; negative when the feature extends beyond the window
    pub to: i64,
    pub strand: Strand,
    pub location: FeatureLocation,
    /// Qualifiers in insertion order; names may repeat
    pub qualifiers: Vec<Qualifier>,
}

impl Feature {
    /// Create a feature whose from/to/strand follow its location
    pub fn new(key: impl Into<String>, location: FeatureLocation) -> Self {
        let (from, to) = feature_span(&location);
        Self {
            key: key.into(),
            from,
            to,
            strand: location.strand,
            location,
            qualifiers: Vec::new(),
        }
    }

    pub fn add_qualifier(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.qualifiers.push(Qualifier {
            name: name.into(),
            value: value.into(),
        });
    }

    /// First value of the named qualifier
    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.value.as_str())
    }

    /// Every value of the named qualifier, in order
    pub fn qualifiers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.qualifiers
            .iter()
            .filter(move |q| q.name == name)
            .map(|q| q.value.as_str())
    }
}

/// Ordered features of one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub features: Vec<Feature>,
    pub generated_at: DateTime<Utc>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features with the given key
    pub fn by_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |f| f.key == key)
    }
}

impl Extend<Feature> for FeatureTable {
    fn extend<T: IntoIterator<Item = Feature>>(&mut self, iter: T) {
        self.features.extend(iter);
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One parsed entry: metadata, features and (possibly windowed) sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub info: SequenceInfo,
    pub features: FeatureTable,
    pub sequence: String,
}
