//! GenBank and GenPept entries

use crate::location::Window;
use crate::record::flatfile::{scan_features, GenbankEntry};
use crate::record::model::{MoleculeKind, SequenceInfo, SequenceRecord, NOT_SPECIFIED};
use crate::record::normalize::{
    clean_taxonomy, collapse_whitespace, or_not_specified, parse_flatfile_date,
};
use crate::record::{build_feature_table, decode, slice_sequence, RecordParser};
use crate::xref::{extract_patent, GENBANK_PATENT_MARKER};
use crate::Result;

/// Division codes that may appear on a `LOCUS` line
const DIVISIONS: &[&str] = &[
    "PRI", "ROD", "MAM", "VRT", "INV", "PLN", "BCT", "VRL", "PHG", "SYN", "UNA", "EST", "PAT",
    "STS", "GSS", "HTG", "HTC", "ENV", "CON", "TSA",
];

/// Parser for GenBank (nucleic) and GenPept (proteic) entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenbankParser {
    pub molecule_kind: MoleculeKind,
}

impl GenbankParser {
    pub fn nucleic() -> Self {
        Self {
            molecule_kind: MoleculeKind::Nucleic,
        }
    }

    pub fn proteic() -> Self {
        Self {
            molecule_kind: MoleculeKind::Proteic,
        }
    }

    fn default_molecule_type(&self) -> &'static str {
        match self.molecule_kind {
            MoleculeKind::Nucleic => "DNA",
            MoleculeKind::Proteic => "aa",
        }
    }
}

/// Fields of a `LOCUS` line
#[derive(Debug, Default, PartialEq, Eq)]
struct LocusLine<'a> {
    name: Option<&'a str>,
    size: Option<u64>,
    molecule_type: Option<&'a str>,
    circular: bool,
    division: Option<&'a str>,
    date: Option<u32>,
}

/// Tokenize a `LOCUS` line value
///
/// Column positions drifted between releases, so tokens are classified by
/// content rather than by column.
fn parse_locus(value: &str) -> LocusLine<'_> {
    let mut locus = LocusLine::default();
    let mut tokens = value.split_whitespace().peekable();
    locus.name = tokens.next();

    while let Some(token) = tokens.next() {
        let lower = token.to_ascii_lowercase();
        if locus.size.is_none() && token.chars().all(|c| c.is_ascii_digit()) {
            if tokens
                .peek()
                .is_some_and(|unit| matches!(unit.to_ascii_lowercase().as_str(), "bp" | "aa" | "rc"))
            {
                tokens.next();
            }
            locus.size = token.parse().ok();
        } else if lower == "circular" {
            locus.circular = true;
        } else if lower == "linear" {
            continue;
        } else if DIVISIONS.contains(&token) {
            locus.division = Some(token);
        } else if let Some(date) = parse_flatfile_date(token) {
            locus.date = Some(date);
        } else if locus.molecule_type.is_none() {
            locus.molecule_type = Some(token);
        }
    }

    locus
}

/// Split an `ORGANISM` block into `species; lineage` for [`clean_taxonomy`]
///
/// The species name may wrap; the lineage starts at the first line holding
/// a `;`. A block without any `;` keeps only its first line as species.
fn organism_block(lines: &[&str]) -> String {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    let split = lines
        .iter()
        .position(|l| l.contains(';'))
        .unwrap_or(lines.len().min(1));
    format!("{}; {}", lines[..split].join(" "), lines[split..].join(" "))
}

impl RecordParser for GenbankParser {
    fn parse(&self, raw: &[u8], window: Window, remap: bool) -> Result<SequenceRecord> {
        let text = decode(raw);
        let entry = GenbankEntry::scan(&text);

        let locus = entry
            .field("LOCUS")
            .and_then(|f| f.lines.first())
            .map(|v| parse_locus(v))
            .unwrap_or_default();

        let id = locus.name.unwrap_or(NOT_SPECIFIED);
        let mut info = SequenceInfo::new(id, self.molecule_kind);
        info.molecule_type = locus
            .molecule_type
            .unwrap_or(self.default_molecule_type())
            .to_string();
        info.topology = if locus.circular { "circular" } else { "linear" }.to_string();
        if let Some(division) = locus.division {
            info.division = division.to_string();
        }
        if let Some(date) = locus.date {
            info.set_dates(&[date]);
        }
        if let Some(definition) = entry.field("DEFINITION") {
            info.description = or_not_specified(&definition.joined());
        }
        if let Some(source) = entry.field("SOURCE") {
            info.organism = or_not_specified(&collapse_whitespace(&source.joined()));
        }
        if let Some(organism) = entry.field("ORGANISM") {
            info.taxonomy = clean_taxonomy(&organism_block(&organism.lines));
        }
        info.length = locus.size.unwrap_or(entry.sequence.len() as u64);

        let patent = entry
            .fields_named("JOURNAL")
            .find_map(|f| extract_patent(&f.joined(), GENBANK_PATENT_MARKER));

        let raw_features = scan_features(&entry.feature_lines);
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
    fn test_parse_locus_modern() {
        let locus = parse_locus("NM_000518    1606 bp    mRNA    linear   PRI 25-MAY-2020");
        assert_eq!(locus.name, Some("NM_000518"));
        assert_eq!(locus.size, Some(1606));
        assert_eq!(locus.molecule_type, Some("mRNA"));
        assert!(!locus.circular);
        assert_eq!(locus.division, Some("PRI"));
        assert_eq!(locus.date, Some(20200525));
    }

    #[test]
    fn test_parse_locus_circular_without_type() {
        let locus = parse_locus("PUC19     2686 bp    circular SYN 01-JAN-2001");
        assert_eq!(locus.molecule_type, None);
        assert!(locus.circular);
        assert_eq!(locus.division, Some("SYN"));
    }

    #[test]
    fn test_organism_block() {
        let block = organism_block(&["Homo sapiens", "Mammalia;", "Chordata."]);
        assert_eq!(clean_taxonomy(&block), "Mammalia;Chordata");
    }

    #[test]
    fn test_organism_block_wrapped_species() {
        let block = organism_block(&[
            "Escherichia coli str. K-12 substr.",
            "MG1655",
            "Bacteria; Proteobacteria; Gammaproteobacteria.",
        ]);
        assert_eq!(
            clean_taxonomy(&block),
            "Bacteria;Proteobacteria;Gammaproteobacteria"
        );
    }

    #[test]
    fn test_organism_block_lineage_without_separator() {
        let block = organism_block(&["Unknown virus", "Viruses."]);
        assert_eq!(clean_taxonomy(&block), "Viruses");
    }

    #[test]
    fn test_blank_definition_is_placeholder() {
        let raw = b"LOCUS       AB000001     10 bp    DNA\nDEFINITION  \nSOURCE      \n//\n";
        let record = GenbankParser::nucleic()
            .parse(raw, Window::whole(), false)
            .unwrap();
        assert_eq!(record.info.description, NOT_SPECIFIED);
        assert_eq!(record.info.organism, NOT_SPECIFIED);
    }

    #[test]
    fn test_genpept_defaults() {
        let raw = b"LOCUS       AAA12345     120 aa\nDEFINITION  hypothetical protein.\n//\n";
        let record = GenbankParser::proteic()
            .parse(raw, Window::whole(), false)
            .unwrap();
        assert_eq!(record.info.id, "AAA12345");
        assert_eq!(record.info.molecule_type, "aa");
        assert_eq!(record.info.length, 120);
        assert_eq!(record.info.organism, NOT_SPECIFIED);
        assert_eq!(record.info.taxonomy, NOT_SPECIFIED);
        assert!(record.features.is_empty());
        assert_eq!(record.sequence, "");
    }
}
