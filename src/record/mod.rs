//! Record parsers for mirrored flat-file entries
//!
//! One [`RecordParser`] per databank grammar; [`RecordFormat`] selects the
//! parser for a reader type. Every parser turns the raw bytes of a single
//! entry into a [`SequenceRecord`] for a coordinate [`Window`]:
//!
//! - features are located with the INSD grammar (or read flat for
//!   UniProt), clipped to the window and optionally remapped to start at 1
//! - missing fields take the [`NOT_SPECIFIED`](model::NOT_SPECIFIED)
//!   placeholders
//! - the sequence is sliced to the window with [`slice_sequence`]

pub mod embl;
pub mod fasta;
pub mod flatfile;
pub mod genbank;
pub mod model;
pub mod normalize;
pub mod uniprot;

pub use embl::EmblParser;
pub use fasta::FastaParser;
pub use genbank::GenbankParser;
pub use model::{
    Feature, FeatureTable, MoleculeKind, Qualifier, SequenceInfo, SequenceRecord,
    DATE_NOT_SPECIFIED, LOCATION_QUALIFIER, NOT_SPECIFIED,
};
pub use uniprot::UniProtParser;

use serde::{Deserialize, Serialize};

use crate::location::{clip, parse_location, remap as remap_location, FeatureLocation, Window};
use crate::record::flatfile::RawFeature;
use crate::Result;

/// Parses the raw bytes of one entry into a record
pub trait RecordParser {
    fn parse(&self, raw: &[u8], window: Window, remap: bool) -> Result<SequenceRecord>;
}

/// Entry grammar of an index partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    GenBank,
    GenPept,
    Embl,
    UniProt,
    Fasta { protein: bool },
}

impl RecordFormat {
    pub fn molecule_kind(&self) -> MoleculeKind {
        match self {
            RecordFormat::GenPept | RecordFormat::UniProt => MoleculeKind::Proteic,
            RecordFormat::Fasta { protein: true } => MoleculeKind::Proteic,
            RecordFormat::GenBank | RecordFormat::Embl | RecordFormat::Fasta { protein: false } => {
                MoleculeKind::Nucleic
            }
        }
    }

    /// Parse `raw` with the parser for this format
    pub fn parse(&self, raw: &[u8], window: Window, remap: bool) -> Result<SequenceRecord> {
        match *self {
            RecordFormat::GenBank => GenbankParser::nucleic().parse(raw, window, remap),
            RecordFormat::GenPept => GenbankParser::proteic().parse(raw, window, remap),
            RecordFormat::Embl => EmblParser.parse(raw, window, remap),
            RecordFormat::UniProt => UniProtParser.parse(raw, window, remap),
            RecordFormat::Fasta { protein } => FastaParser { protein }.parse(raw, window, remap),
        }
    }
}

/// Slice a sequence to a 1-based inclusive window
///
/// The whole window and an empty payload (assembly stubs without a
/// sequence) return the input unchanged. Window edges are clamped to the
/// sequence.
pub fn slice_sequence(sequence: &str, window: Window) -> String {
    if window.is_whole() || sequence.is_empty() {
        return sequence.to_string();
    }
    let len = sequence.len() as i64;
    let begin = (window.start.max(1) - 1).min(len) as usize;
    let end = window.stop.clamp(0, len) as usize;
    if begin >= end {
        return String::new();
    }
    sequence[begin..end].to_string()
}

/// Decode an entry buffer; flat files are ASCII but stray bytes must not fail a lookup
pub(crate) fn decode(raw: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(raw)
}

/// Clip and optionally remap a location; `None` when nothing is left in the window
pub(crate) fn place_location(
    location: &FeatureLocation,
    window: Window,
    remap: bool,
) -> Option<FeatureLocation> {
    let mut placed = clip(location, window)?;
    if remap {
        remap_location(&mut placed, window);
    }
    Some(placed)
}

/// Build a feature from an already parsed location
///
/// The qualifiers are copied except the reserved `Location` name, and a
/// synthetic `Location` qualifier with the final location text is appended.
pub(crate) fn build_feature<I>(
    key: &str,
    location: &FeatureLocation,
    qualifiers: I,
    window: Window,
    remap: bool,
) -> Option<Feature>
where
    I: IntoIterator<Item = (String, String)>,
{
    let placed = place_location(location, window, remap)?;
    let location_text = placed.to_string();
    let mut feature = Feature::new(key, placed);
    for (name, value) in qualifiers {
        if name != LOCATION_QUALIFIER {
            feature.add_qualifier(name, value);
        }
    }
    feature.add_qualifier(LOCATION_QUALIFIER, location_text);
    Some(feature)
}

/// Turn scanned INSD features into a feature table
///
/// Shared by the GenBank and EMBL parsers. A feature whose location cannot
/// be parsed, or that falls outside the window, is dropped on its own.
/// `source` features receive the entry's patent id as a `db_xref`.
pub(crate) fn build_feature_table(
    raw_features: Vec<RawFeature>,
    seq_id: &str,
    window: Window,
    remap: bool,
    patent: Option<&str>,
) -> FeatureTable {
    let mut table = FeatureTable::new();

    for raw in raw_features {
        let location = match parse_location(&raw.location, seq_id, 0) {
            Ok(location) => location,
            Err(e) => {
                log::debug!(
                    "{}: dropping {} feature\n{}",
                    seq_id,
                    raw.key,
                    e.detailed_message(&raw.location.split_whitespace().collect::<String>())
                );
                continue;
            }
        };

        let is_source = raw.key == "source";
        let Some(mut feature) =
            build_feature(&raw.key, &location, raw.qualifiers, window, remap)
        else {
            continue;
        };
        if is_source {
            if let Some(patent) = patent {
                feature.add_qualifier("db_xref", patent);
            }
        }
        table.push(feature);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Window::whole(), "ACGTACGTAC")]
    #[case(Window::new(1, 4), "ACGT")]
    #[case(Window::new(3, 5), "GTA")]
    #[case(Window::new(8, 100), "TAC")]
    #[case(Window::new(20, 30), "")]
    fn test_slice_sequence(#[case] window: Window, #[case] expected: &str) {
        assert_eq!(slice_sequence("ACGTACGTAC", window), expected);
    }

    #[test]
    fn test_slice_empty_payload_untouched() {
        assert_eq!(slice_sequence("", Window::new(5, 10)), "");
    }

    #[test]
    fn test_format_molecule_kind() {
        assert_eq!(RecordFormat::GenPept.molecule_kind(), MoleculeKind::Proteic);
        assert_eq!(RecordFormat::Embl.molecule_kind(), MoleculeKind::Nucleic);
        assert_eq!(
            RecordFormat::Fasta { protein: true }.molecule_kind(),
            MoleculeKind::Proteic
        );
    }

    #[test]
    fn test_feature_table_drops_bad_location() {
        let raw = vec![
            RawFeature {
                key: "gene".to_string(),
                location: "join(1..5,join(7..9))".to_string(),
                qualifiers: vec![],
            },
            RawFeature {
                key: "source".to_string(),
                location: "1..100".to_string(),
                qualifiers: vec![
                    ("Location".to_string(), "stale".to_string()),
                    ("organism".to_string(), "Mus musculus".to_string()),
                ],
            },
        ];
        let table = build_feature_table(raw, "X1", Window::whole(), false, Some("pat:EP1234"));
        assert_eq!(table.len(), 1);
        let source = &table.features[0];
        assert_eq!(source.qualifier("Location"), Some("1..100"));
        assert_eq!(source.qualifiers_named("Location").count(), 1);
        assert_eq!(source.qualifier("db_xref"), Some("pat:EP1234"));
    }

    #[test]
    fn test_feature_table_clips_and_remaps() {
        let raw = vec![
            RawFeature {
                key: "CDS".to_string(),
                location: "40..120".to_string(),
                qualifiers: vec![],
            },
            RawFeature {
                key: "gene".to_string(),
                location: "200..300".to_string(),
                qualifiers: vec![],
            },
        ];
        let table = build_feature_table(raw, "X1", Window::new(51, 150), true, None);
        assert_eq!(table.len(), 1);
        let cds = &table.features[0];
        assert_eq!((cds.from, cds.to), (-1, 70));
        assert_eq!(cds.qualifier("Location"), Some("<1..70"));
    }
}
