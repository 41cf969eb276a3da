//! UniProtKB/Swiss-Prot entries
//!
//! UniProt features carry flat `from`/`to` positions instead of INSD
//! locations. Two feature-table layouts are read:
//!
//! ```text
//! FT   CHAIN         1    105       Cytochrome c.            (before 2019)
//! FT   CHAIN           2..105                                (current)
//! FT                   /note="Cytochrome c"
//! ```
//!
//! After the feature table, a cross-reference pass adds a `source` feature
//! (organism and taxon id) and a `protein` feature (product name, EC
//! numbers, `DR` cross-references) spanning the whole sequence.

use crate::location::{FPosition, FRange, FeatureLocation, Strand, Window};
use crate::record::flatfile::LineCodedEntry;
use crate::record::model::{FeatureTable, MoleculeKind, SequenceInfo, SequenceRecord, NOT_SPECIFIED};
use crate::record::normalize::{clean_lineage, collapse_whitespace, extract_dates, or_not_specified};
use crate::record::{build_feature, decode, slice_sequence, RecordParser};
use crate::xref::{extract_ec_numbers, extract_protein_name, extract_taxon_id, format_dr_xref};
use crate::Result;

/// Prefix marking a descriptive text as a cross-reference
const DB_XREF: &str = "db_xref";

/// Parser for UniProt entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniProtParser;

/// A UniProt feature before placement
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatFeature {
    key: String,
    from: String,
    to: String,
    qualifiers: Vec<(String, String)>,
}

impl FlatFeature {
    /// Location of the feature, or `None` when an endpoint is unknown
    fn location(&self) -> Option<FeatureLocation> {
        let min = parse_endpoint(&self.from)?;
        let max = parse_endpoint(&self.to)?;
        Some(FeatureLocation::single(Strand::Plus, FRange::new(min, max)))
    }
}

/// Parse `12`, `<1` or `>105`; `?`-prefixed and empty endpoints are unknown
fn parse_endpoint(text: &str) -> Option<FPosition> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix('<') {
        return rest.parse().ok().map(|p| FPosition::exact(p).with_fuzzy_start());
    }
    if let Some(rest) = text.strip_prefix('>') {
        return rest.parse().ok().map(|p| FPosition::exact(p).with_fuzzy_end());
    }
    text.parse().ok().map(FPosition::exact)
}

/// Split a descriptive text into a qualifier for feature `key`
///
/// `db_xref=...` texts become `db_xref` qualifiers; anything else is stored
/// under the feature key itself.
fn describe(key: &str, text: &str) -> (String, String) {
    let text = text.trim();
    if text.starts_with(DB_XREF) {
        if let Some((_, value)) = text.split_once('=') {
            return (DB_XREF.to_string(), value.trim().to_string());
        }
    }
    (key.to_string(), text.to_string())
}

/// Read the `FT` lines of an entry into flat features
fn scan_flat_features<'a, I>(lines: I) -> Vec<FlatFeature>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut features: Vec<FlatFeature> = Vec::new();
    // Open legacy description or `/name="value"` qualifier of the last feature
    let mut open: Option<(String, String)> = None;
    let mut legacy_text = false;

    let close = |feature: Option<&mut FlatFeature>, open: &mut Option<(String, String)>| {
        if let (Some(feature), Some((name, value))) = (feature, open.take()) {
            let value = value.trim().trim_matches('"').to_string();
            let qualifier = if name.is_empty() || name == "note" {
                describe(&feature.key, &value)
            } else {
                (name, value)
            };
            if !qualifier.1.is_empty() {
                feature.qualifiers.push(qualifier);
            }
        }
    };

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        if !line.starts_with(' ') {
            close(features.last_mut(), &mut open);
            let mut tokens = line.split_whitespace();
            let key = tokens.next().unwrap_or_default().to_ascii_lowercase();
            let first = tokens.next().unwrap_or_default();

            let (from, to, description) = match first.split_once("..") {
                Some((from, to)) => (from.to_string(), to.to_string(), None),
                None => match tokens.next() {
                    Some(to) => {
                        let rest: Vec<&str> = tokens.collect();
                        (first.to_string(), to.to_string(), Some(rest.join(" ")))
                    }
                    // Current layout, single position
                    None => (first.to_string(), first.to_string(), None),
                },
            };

            legacy_text = description.is_some();
            if let Some(description) = description.filter(|d| !d.is_empty()) {
                open = Some((String::new(), description));
            }
            features.push(FlatFeature {
                key,
                from,
                to,
                qualifiers: Vec::new(),
            });
            continue;
        }

        let content = line.trim();
        let quote_open = open
            .as_ref()
            .is_some_and(|(_, value)| value.matches('"').count() % 2 == 1);

        if quote_open {
            if let Some((_, value)) = open.as_mut() {
                value.push(' ');
                value.push_str(content);
            }
        } else if let Some(qualifier) = content.strip_prefix('/') {
            close(features.last_mut(), &mut open);
            let (name, value) = qualifier.split_once('=').unwrap_or((qualifier, ""));
            open = Some((name.to_string(), value.to_string()));
        } else if legacy_text {
            match open.as_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(content);
                }
                None => open = Some((String::new(), content.to_string())),
            }
        }
    }
    close(features.last_mut(), &mut open);

    features
}

/// Fields of a UniProt `ID` line: `CYC_HUMAN  Reviewed;  105 AA.`
fn parse_id_line(value: &str) -> (Option<&str>, Option<&str>, Option<u64>) {
    let mut parts = value.split(';');
    let head = parts.next().unwrap_or_default();
    let mut head_tokens = head.split_whitespace();
    let id = head_tokens.next();
    let status = head_tokens.next();
    let length = parts
        .next()
        .and_then(|p| p.split_whitespace().next())
        .and_then(|n| n.parse().ok());
    (id, status, length)
}

/// A feature spanning the whole sequence
fn whole_sequence(length: u64) -> FeatureLocation {
    FeatureLocation::single(Strand::Plus, FRange::span(1, length.max(1) as i64))
}

impl RecordParser for UniProtParser {
    fn parse(&self, raw: &[u8], window: Window, remap: bool) -> Result<SequenceRecord> {
        let text = decode(raw);
        let entry = LineCodedEntry::scan(&text);

        let (id, status, length) = entry.first("ID").map(parse_id_line).unwrap_or_default();

        let mut info = SequenceInfo::new(id.unwrap_or(NOT_SPECIFIED), MoleculeKind::Proteic);
        info.molecule_type = "aa".to_string();
        info.topology = "linear".to_string();
        if let Some(status) = status {
            info.division = status.to_string();
        }
        let description = entry.joined("DE");
        if let Some(description) = &description {
            info.description = or_not_specified(description);
        }
        info.set_dates(&extract_dates(entry.values("DT")));
        if let Some(organism) = entry.joined("OS") {
            info.organism = or_not_specified(&collapse_whitespace(organism.trim_end_matches('.')));
        }
        if let Some(lineage) = entry.joined("OC") {
            info.taxonomy = clean_lineage(&lineage);
        }
        info.length = length.unwrap_or(entry.sequence.len() as u64);

        let mut features = FeatureTable::new();
        let whole = whole_sequence(info.length);

        // Cross-reference features first, then the entry's own table
        let mut source = vec![("organism".to_string(), info.organism.clone())];
        if let Some(taxon) = entry.values("OX").find_map(extract_taxon_id) {
            source.push((DB_XREF.to_string(), format!("taxon:{}", taxon)));
        }
        features.extend(build_feature("source", &whole, source, window, remap));

        let mut xrefs: Vec<(String, String)> = description
            .as_deref()
            .map(extract_ec_numbers)
            .unwrap_or_default()
            .into_iter()
            .chain(entry.values("DR").filter_map(format_dr_xref))
            .map(|x| (DB_XREF.to_string(), x))
            .collect();

        match description.as_deref().and_then(extract_protein_name) {
            Some(product) => {
                xrefs.insert(0, ("product".to_string(), product));
                features.extend(build_feature("protein", &whole, xrefs, window, remap));
            }
            None if !xrefs.is_empty() => {
                features.extend(build_feature(DB_XREF, &whole, xrefs, window, remap));
            }
            None => {}
        }

        for flat in scan_flat_features(entry.values("FT")) {
            let Some(location) = flat.location() else {
                log::debug!(
                    "{}: dropping {} feature with unknown endpoint {}..{}",
                    info.id,
                    flat.key,
                    flat.from,
                    flat.to
                );
                continue;
            };
            features.extend(build_feature(&flat.key, &location, flat.qualifiers, window, remap));
        }

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
        let (id, status, length) = parse_id_line("CYC_HUMAN               Reviewed;         105 AA.");
        assert_eq!(id, Some("CYC_HUMAN"));
        assert_eq!(status, Some("Reviewed"));
        assert_eq!(length, Some(105));
    }

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(parse_endpoint("12"), Some(FPosition::exact(12)));
        assert!(parse_endpoint("<1").unwrap().fuzzy_start);
        assert!(parse_endpoint(">105").unwrap().fuzzy_end);
        assert_eq!(parse_endpoint("?"), None);
        assert_eq!(parse_endpoint("?12"), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe("domain", "db_xref=PDB:1ABC"),
            ("db_xref".to_string(), "PDB:1ABC".to_string())
        );
        assert_eq!(
            describe("chain", "Cytochrome c"),
            ("chain".to_string(), "Cytochrome c".to_string())
        );
    }

    #[test]
    fn test_legacy_feature_layout() {
        let lines = [
            "CHAIN         2    105       Cytochrome c.",
            "                             /FTId=PRO_0000108218.",
            "METAL        19     19       Iron (heme axial ligand).",
            "DOMAIN       ?      40       Unknown start.",
        ];
        let features = scan_flat_features(lines);
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].key, "chain");
        assert_eq!((features[0].from.as_str(), features[0].to.as_str()), ("2", "105"));
        assert_eq!(
            features[0].qualifiers[0],
            ("chain".to_string(), "Cytochrome c.".to_string())
        );
        assert_eq!(features[0].qualifiers[1].0, "FTId");
        assert!(features[2].location().is_none());
    }

    #[test]
    fn test_current_feature_layout() {
        let lines = [
            "CHAIN           2..105",
            "                /note=\"Cytochrome c, long",
            "                name\"",
            "                /evidence=\"ECO:0000269\"",
            "BINDING         19",
            "                /note=\"db_xref=ChEBI:30413\"",
        ];
        let features = scan_flat_features(lines);
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0].qualifiers,
            vec![
                ("chain".to_string(), "Cytochrome c, long name".to_string()),
                ("evidence".to_string(), "ECO:0000269".to_string()),
            ]
        );
        assert_eq!((features[1].from.as_str(), features[1].to.as_str()), ("19", "19"));
        assert_eq!(
            features[1].qualifiers[0],
            ("db_xref".to_string(), "ChEBI:30413".to_string())
        );
    }
}
