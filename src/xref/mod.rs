//! Cross-reference extraction from free-text annotation
//!
//! Flat-file entries bury several identifiers in prose lines. These
//! scanners pull them out into `db_xref`-style values:
//!
//! | Source line | Value |
//! |-------------|-------|
//! | GenBank `JOURNAL   Patent: EP 0325066-A1 ...` | `pat:EP0325066` |
//! | EMBL `RL   Patent number EP0238993-A2/1, ...` | `pat:EP0238993` |
//! | UniProt `DE   ... EC=3.4.11.18 {...};` | `EC; 3.4.11.18; -.` |
//! | UniProt `OX   NCBI_TaxID=10090;` | `10090` |
//! | UniProt `DR   EMBL; M22877; ...` | `EMBL:M22877` |

use memchr::memmem;

/// Marker preceding a patent number in a GenBank `JOURNAL` line
pub const GENBANK_PATENT_MARKER: &str = "Patent:";
/// Marker preceding a patent number in an EMBL `RL` or `CC` line
pub const EMBL_PATENT_MARKER: &str = "Patent number";

const EC_MARKER: &str = "EC=";
const TAXON_MARKER: &str = "NCBI_TaxID=";

/// Minimum number of collected characters before a separator ends the code
const PATENT_MIN_CHARS: usize = 4;

/// Extract a patent identifier following `marker` in `text`
///
/// After the marker, alphanumerics are collected and anything else is
/// skipped, until at least four characters have been collected and a
/// non-alphanumeric character is reached. This folds `EP 0325066-A1` into
/// `EP0325066`. The heuristic is kept exactly as is; downstream consumers
/// depend on its output.
///
/// # Example
///
/// ```
/// use ferro_mirror::xref::{extract_patent, GENBANK_PATENT_MARKER};
///
/// let line = "JOURNAL   Patent: EP 0325066-A1 26-JUL-1989";
/// assert_eq!(
///     extract_patent(line, GENBANK_PATENT_MARKER).as_deref(),
///     Some("pat:EP0325066")
/// );
/// ```
pub fn extract_patent(text: &str, marker: &str) -> Option<String> {
    let idx = memmem::find(text.as_bytes(), marker.as_bytes())?;
    let rest = &text[idx + marker.len()..];

    let mut code = String::new();
    for c in rest.chars() {
        if c.is_ascii_alphanumeric() {
            code.push(c);
        } else if code.len() >= PATENT_MIN_CHARS {
            break;
        }
    }

    if code.is_empty() {
        None
    } else {
        Some(format!("pat:{}", code))
    }
}

/// Extract every `EC=` number of a description as `db_xref` values
///
/// Each capture runs up to the next `{` or `;`; scanning then continues on
/// the remainder of the line.
pub fn extract_ec_numbers(description: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = description;

    while let Some(idx) = memmem::find(rest.as_bytes(), EC_MARKER.as_bytes()) {
        let after = &rest[idx + EC_MARKER.len()..];
        let stop = after.find(['{', ';']).unwrap_or(after.len());
        let code = after[..stop].trim();
        if !code.is_empty() {
            found.push(format_ec_xref(code));
        }
        rest = &after[stop..];
    }

    found
}

/// Format an EC number the way it appears in a `db_xref` qualifier
pub fn format_ec_xref(code: &str) -> String {
    format!("EC; {}; -.", code)
}

/// Extract the NCBI taxon id from an organism-id line
///
/// Digits directly after `NCBI_TaxID=` are taken; the first non-digit ends
/// the id, so trailing evidence blocks like `{ECO:...}` are ignored.
pub fn extract_taxon_id(line: &str) -> Option<String> {
    let idx = memmem::find(line.as_bytes(), TAXON_MARKER.as_bytes())?;
    let digits: String = line[idx + TAXON_MARKER.len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Extract the recommended (or submitted) protein name from a description
pub fn extract_protein_name(description: &str) -> Option<String> {
    for marker in ["RecName: Full=", "SubName: Full=", "Full="] {
        if let Some(idx) = memmem::find(description.as_bytes(), marker.as_bytes()) {
            let after = &description[idx + marker.len()..];
            let end = after.find(';').unwrap_or(after.len());
            let name = strip_evidence(&after[..end]);
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    // Pre-2008 descriptions are plain prose: "Cytochrome c (EC 1.1.1.1)."
    let plain = description.split(" (").next().unwrap_or("");
    let plain = plain.trim().trim_end_matches('.').trim();
    if plain.is_empty() || plain.contains('=') {
        None
    } else {
        Some(plain.to_string())
    }
}

/// Format a UniProt `DR` line body as a `db_xref` value
///
/// `EMBL; M22877; AAA35732.1; -; Genomic_DNA.` becomes `EMBL:M22877`.
pub fn format_dr_xref(line: &str) -> Option<String> {
    let mut fields = line.split(';').map(str::trim);
    let database = fields.next().filter(|s| !s.is_empty())?;
    let primary = fields
        .next()
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())?;
    Some(format!("{}:{}", database, primary))
}

/// Remove `{...}` evidence blocks and surrounding whitespace
pub fn strip_evidence(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}
