//! Feature location model
//!
//! INSD feature locations describe where a feature sits on its sequence:
//! - Single positions: `467`, `<1`, `>1000`
//! - Positions somewhere inside a span: `(102.110)`
//! - Sites between two adjacent bases: `123^124`
//! - Ranges of positions: `340..565`, `<345..500`
//! - Compound locations: `join(...)`, `order(...)` and friends
//!
//! Coordinates are 1-based and inclusive throughout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strand of a feature location
///
/// Locations without an explicit strand are treated as `Plus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "plus"),
            Strand::Minus => write!(f, "minus"),
        }
    }
}

/// How a position pins down its base(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionType {
    /// A single known base, possibly with an open boundary (`<1`, `>100`)
    #[default]
    Unique,
    /// One base somewhere within `start..end` (`(102.110)`)
    InRange,
    /// The site between two bases (`123^124`)
    BetweenBases,
}

/// A position within a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FPosition {
    pub start: i64,
    pub end: i64,
    /// Boundary extends beyond `start` (`<`)
    pub fuzzy_start: bool,
    /// Boundary extends beyond `end` (`>`)
    pub fuzzy_end: bool,
    pub kind: PositionType,
}

impl FPosition {
    /// An exact single-base position
    pub fn exact(pos: i64) -> Self {
        Self {
            start: pos,
            end: pos,
            fuzzy_start: false,
            fuzzy_end: false,
            kind: PositionType::Unique,
        }
    }

    /// A single base somewhere between `start` and `end`
    pub fn in_range(start: i64, end: i64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            fuzzy_start: false,
            fuzzy_end: false,
            kind: PositionType::InRange,
        }
    }

    /// The site between `start` and `end`
    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            fuzzy_start: false,
            fuzzy_end: false,
            kind: PositionType::BetweenBases,
        }
    }

    pub fn with_fuzzy_start(mut self) -> Self {
        self.fuzzy_start = true;
        self
    }

    pub fn with_fuzzy_end(mut self) -> Self {
        self.fuzzy_end = true;
        self
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy_start || self.fuzzy_end
    }

    /// Shift both ends of the position, saturating at the `i64` bounds
    pub fn shift(&mut self, offset: i64) {
        self.start = self.start.saturating_add(offset);
        self.end = self.end.saturating_add(offset);
    }

    /// Shifted copy, or `None` if either end would overflow
    pub fn checked_shift(&self, offset: i64) -> Option<Self> {
        Some(Self {
            start: self.start.checked_add(offset)?,
            end: self.end.checked_add(offset)?,
            ..*self
        })
    }
}

impl fmt::Display for FPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fuzzy_start {
            write!(f, "<")?;
        }
        if self.fuzzy_end {
            write!(f, ">")?;
        }
        match self.kind {
            PositionType::Unique if self.start == self.end => write!(f, "{}", self.start),
            PositionType::Unique => write!(f, "{}..{}", self.start, self.end),
            PositionType::InRange => write!(f, "({}.{})", self.start, self.end),
            PositionType::BetweenBases => write!(f, "{}^{}", self.start, self.end),
        }
    }
}

/// A contiguous range between two positions, optionally on another entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FRange {
    pub min: FPosition,
    pub max: FPosition,
    /// Foreign entry for cross-entry locations (`J00123.1:100..200`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
}

impl FRange {
    pub fn new(min: FPosition, max: FPosition) -> Self {
        Self {
            min,
            max,
            accession: None,
        }
    }

    /// A range covering a single position
    pub fn point(pos: FPosition) -> Self {
        Self::new(pos, pos)
    }

    /// An exact `begin..end` range
    pub fn span(begin: i64, end: i64) -> Self {
        Self::new(FPosition::exact(begin), FPosition::exact(end))
    }

    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }

    /// First base covered
    pub fn begin(&self) -> i64 {
        self.min.start
    }

    /// Last base covered
    pub fn finish(&self) -> i64 {
        self.max.end
    }

    /// Whether the range points into another entry
    pub fn is_foreign(&self) -> bool {
        self.accession.is_some()
    }

    fn is_single_position(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for FRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(acc) = &self.accession {
            write!(f, "{}:", acc)?;
        }
        if self.is_single_position() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

/// Operator of a compound location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundKind {
    /// Ranges are joined into one contiguous product
    Join,
    /// Ranges are listed in order without implying joining
    Order,
    /// Any other operator, kept by name (`one-of`, `group`, ...)
    Other(String),
}

impl CompoundKind {
    pub fn from_operator(name: &str) -> Self {
        match name {
            "join" => CompoundKind::Join,
            "order" => CompoundKind::Order,
            other => CompoundKind::Other(other.to_string()),
        }
    }

    pub fn operator(&self) -> &str {
        match self {
            CompoundKind::Join => "join",
            CompoundKind::Order => "order",
            CompoundKind::Other(name) => name,
        }
    }
}

/// Shape of a location: one range or an operator over several
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationShape {
    Single(FRange),
    Compound {
        kind: CompoundKind,
        ranges: Vec<FRange>,
    },
}

/// A parsed feature location
///
/// # Invariant
///
/// For `Minus` strand compound locations the ranges are stored in reverse
/// document order, so consumers walk them 5' to 3' on the biological strand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureLocation {
    pub strand: Strand,
    pub shape: LocationShape,
}

impl FeatureLocation {
    pub fn single(strand: Strand, range: FRange) -> Self {
        Self {
            strand,
            shape: LocationShape::Single(range),
        }
    }

    pub fn compound(strand: Strand, kind: CompoundKind, ranges: Vec<FRange>) -> Self {
        Self {
            strand,
            shape: LocationShape::Compound { kind, ranges },
        }
    }

    /// Ranges in storage order (biological order for compound locations)
    pub fn ranges(&self) -> &[FRange] {
        match &self.shape {
            LocationShape::Single(range) => std::slice::from_ref(range),
            LocationShape::Compound { ranges, .. } => ranges,
        }
    }

    pub fn ranges_mut(&mut self) -> &mut [FRange] {
        match &mut self.shape {
            LocationShape::Single(range) => std::slice::from_mut(range),
            LocationShape::Compound { ranges, .. } => ranges,
        }
    }

    /// Compound operator, if any
    pub fn kind(&self) -> Option<&CompoundKind> {
        match &self.shape {
            LocationShape::Single(_) => None,
            LocationShape::Compound { kind, .. } => Some(kind),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.shape, LocationShape::Compound { .. })
    }

    /// Ranges on this entry (not pointing to a foreign accession)
    pub fn local_ranges(&self) -> impl Iterator<Item = &FRange> {
        self.ranges().iter().filter(|r| !r.is_foreign())
    }

    /// Whether no range on this entry remains
    pub fn is_empty(&self) -> bool {
        self.local_ranges().next().is_none()
    }
}

impl fmt::Display for FeatureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.shape {
            LocationShape::Single(range) => range.to_string(),
            LocationShape::Compound { kind, ranges } => {
                let mut parts: Vec<String> = ranges.iter().map(ToString::to_string).collect();
                if self.strand == Strand::Minus {
                    parts.reverse();
                }
                format!("{}({})", kind.operator(), parts.join(","))
            }
        };
        match self.strand {
            Strand::Plus => write!(f, "{}", body),
            Strand::Minus => write!(f, "complement({})", body),
        }
    }
}
