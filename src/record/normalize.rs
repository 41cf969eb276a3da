//! Field normalization shared by the record parsers
//!
//! Dates become `YYYYMMDD` integers and organism lineages become
//! `;`-joined token lists.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::model::NOT_SPECIFIED;

static FLATFILE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}-[A-Za-z]{3}-\d{4})\b").expect("valid date pattern"));

/// Parse a flat-file date (`21-JUN-1999`) into `19990621`
pub fn parse_flatfile_date(text: &str) -> Option<u32> {
    let date = NaiveDate::parse_from_str(text.trim(), "%d-%b-%Y").ok()?;
    let year = u32::try_from(date.year()).ok()?;
    Some(year * 10_000 + date.month() * 100 + date.day())
}

/// Every flat-file date found in `lines`, in order of appearance
pub fn extract_dates<'a, I>(lines: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .flat_map(|line| FLATFILE_DATE.find_iter(line))
        .filter_map(|m| parse_flatfile_date(m.as_str()))
        .collect()
}

/// Clean a GenBank `ORGANISM` block into a lineage
///
/// The block starts with the species name, which is removed up to the first
/// `;`; the remaining tokens go through [`clean_lineage`].
///
/// ```
/// use ferro_mirror::record::normalize::clean_taxonomy;
///
/// assert_eq!(clean_taxonomy("Homo sapiens; Mammalia; Chordata."), "Mammalia;Chordata");
/// ```
pub fn clean_taxonomy(raw: &str) -> String {
    let without_brackets = strip_list_artifacts(raw);
    match without_brackets.split_once(';') {
        Some((_species, lineage)) => clean_lineage(lineage),
        None => clean_lineage(&without_brackets),
    }
}

/// Normalize a lineage (`Eukaryota; Metazoa; Chordata.`) to `Eukaryota;Metazoa;Chordata`
///
/// Returns [`NOT_SPECIFIED`] when no token remains.
pub fn clean_lineage(raw: &str) -> String {
    let without_brackets = strip_list_artifacts(raw);
    let tokens: Vec<&str> = without_brackets
        .split(';')
        .map(|t| t.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == ','))
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        tokens.join(";")
    }
}

/// Remove `[`/`]` left over from multi-line values rendered as lists
fn strip_list_artifacts(raw: &str) -> String {
    raw.chars().filter(|&c| c != '[' && c != ']').collect()
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Value or placeholder when blank
pub fn or_not_specified(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("21-JUN-1999", Some(19990621))]
    #[case("01-jan-2000", Some(20000101))]
    #[case("5-MAR-2024", Some(20240305))]
    #[case("31-FOO-1999", None)]
    #[case("", None)]
    fn test_parse_flatfile_date(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_flatfile_date(input), expected);
    }

    #[test]
    fn test_extract_dates() {
        let lines = [
            "28-APR-1992 (Rel. 31, Created)",
            "05-SEP-2006 (Rel. 89, Last updated, Version 6)",
        ];
        assert_eq!(extract_dates(lines), vec![19920428, 20060905]);
    }

    #[test]
    fn test_clean_taxonomy_species_removed() {
        assert_eq!(
            clean_taxonomy("Homo sapiens; Mammalia; Chordata."),
            "Mammalia;Chordata"
        );
    }

    #[test]
    fn test_clean_taxonomy_list_artifacts() {
        assert_eq!(
            clean_taxonomy("[Mus musculus; Eukaryota; Metazoa;, Mammalia; Muridae; Mus.]"),
            "Eukaryota;Metazoa;Mammalia;Muridae;Mus"
        );
    }

    #[test]
    fn test_clean_lineage() {
        assert_eq!(
            clean_lineage("Eukaryota; Viridiplantae; Streptophyta."),
            "Eukaryota;Viridiplantae;Streptophyta"
        );
        assert_eq!(clean_lineage("  ; . "), NOT_SPECIFIED);
    }

    #[test]
    fn test_whitespace_helpers() {
        assert_eq!(collapse_whitespace("a   b\n c"), "a b c");
        assert_eq!(or_not_specified("  "), NOT_SPECIFIED);
        assert_eq!(or_not_specified(" x "), "x");
    }
}
