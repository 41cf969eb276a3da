//! EMBL entries

use crate::location::Window;
use crate::record::flatfile::{scan_features, LineCodedEntry};
use crate::record::model::{MoleculeKind, SequenceInfo, SequenceRecord, NOT_SPECIFIED};
use crate::record::normalize::{clean_lineage, collapse_whitespace, extract_dates, or_not_specified};
use crate::record::{build_feature_table, decode, slice_sequence, RecordParser};
use crate::xref::{extract_patent, EMBL_PATENT_MARKER};
use crate::Result;

/// Parser for EMBL nucleotide entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmblParser;

/// Fields of an `ID` line
#[derive(Debug, Default, PartialEq, Eq)]
struct IdLine<'a> {
    id: Option<&'a str>,
    topology: Option<&'a str>,
    molecule_type: Option<&'a str>,
    division: Option<&'a str>,
    length: Option<u64>,
}

/// Split an `ID` line on `;`
///
/// Current layout: `X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.`
/// (id, version, topology, molecule type, data class, division, length).
/// The pre-2006 layout `AA03518 standard; DNA; FUN; 237 BP.` is also read.
fn parse_id_line(value: &str) -> IdLine<'_> {
    let tokens: Vec<&str> = value.split(';').map(str::trim).collect();
    let mut line = IdLine {
        id: tokens
            .first()
            .and_then(|t| t.split_whitespace().next()),
        ..IdLine::default()
    };

    if tokens.len() >= 7 {
        line.topology = tokens.get(2).copied();
        line.molecule_type = tokens.get(3).copied();
        line.division = tokens.get(5).copied();
    } else if tokens.len() >= 4 {
        line.molecule_type = tokens.get(1).copied();
        line.division = tokens.get(2).copied();
    }
    line.length = tokens.last().and_then(|t| {
        t.split_whitespace()
            .next()
            .and_then(|n| n.parse::<u64>().ok())
    });

    line.topology = line.topology.filter(|t| !t.is_empty());
    line.molecule_type = line.molecule_type.filter(|t| !t.is_empty());
    line.division = line.division.filter(|t| !t.is_empty());
    line
}

impl RecordParser for EmblParser {
    fn parse(&self, raw: &[u8], window: Window, remap: bool) -> Result<SequenceRecord> {
        let text = decode(raw);
        let entry = LineCodedEntry::scan(&text);

        let id_line = entry.first("ID").map(parse_id_line).unwrap_or_default();

        let mut info = SequenceInfo::new(id_line.id.unwrap_or(NOT_SPECIFIED), MoleculeKind::Nucleic);
        info.topology = id_line.topology.unwrap_or("linear").to_string();
        info.molecule_type = id_line.molecule_type.unwrap_or("DNA").to_string();
        if let Some(division) = id_line.division {
            info.division = division.to_string();
        }
        if let Some(description) = entry.joined("DE") {
            info.description = or_not_specified(&description);
        }
        info.set_dates(&extract_dates(entry.values("DT")));
        if let Some(organism) = entry.joined("OS") {
            info.organism = or_not_specified(&collapse_whitespace(&organism));
        }
        if let Some(lineage) = entry.joined("OC") {
            info.taxonomy = clean_lineage(&lineage);
        }
        info.length = id_line.length.unwrap_or(entry.sequence.len() as u64);

        let patent = entry
            .values("RL")
            .chain(entry.values("CC"))
            .find_map(|line| extract_patent(line, EMBL_PATENT_MARKER));

        let raw_features = scan_features(entry.feature_lines());
        let features =
            build_feature_table(raw_features, &info.id, window, remap, patent.as_deref());

        log::debug!("{}: parsed {} features", info.id, features.len());

        Ok(SequenceRecord {
            sequence: slice_sequence(&entry.sequence, window),
            info,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_line() {
        let line = parse_id_line("X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.");
        assert_eq!(line.id, Some("X56734"));
        assert_eq!(line.topology, Some("linear"));
        assert_eq!(line.molecule_type, Some("mRNA"));
        assert_eq!(line.division, Some("PLN"));
        assert_eq!(line.length, Some(1859));
    }

    #[test]
    fn test_parse_legacy_id_line() {
        let line = parse_id_line("AA03518    standard; DNA; FUN; 237 BP.");
        assert_eq!(line.id, Some("AA03518"));
        assert_eq!(line.topology, None);
        assert_eq!(line.molecule_type, Some("DNA"));
        assert_eq!(line.division, Some("FUN"));
        assert_eq!(line.length, Some(237));
    }

    #[test]
    fn test_missing_id_line() {
        let record = EmblParser
            .parse(b"DE   orphan\n//\n", Window::whole(), false)
            .unwrap();
        assert_eq!(record.info.id, NOT_SPECIFIED);
        assert_eq!(record.info.description, "orphan");
        assert_eq!(record.info.creation_date, 0);
    }
}
