//! Line-level scanning of flat-file entries
//!
//! Two header layouts are in use:
//!
//! - GenBank/GenPept: a keyword in the first 12 columns (`LOCUS`,
//!   `  ORGANISM`), continuation lines indented by 12 spaces
//! - EMBL/UniProt: a two-letter line code in columns 1-2, value from
//!   column 6 (`ID`, `DE`, `FT`, ...)
//!
//! Both share the INSD feature table layout once the EMBL `FT` prefix is
//! replaced by blanks: feature key from column 6, location and qualifiers
//! from column 22.

/// Column where GenBank header values start
const GENBANK_VALUE_COLUMN: usize = 12;
/// Column where feature keys start in GenBank layout
const FEATURE_KEY_COLUMN: usize = 5;
/// Width of the EMBL/UniProt line-code prefix (`FT   `)
const LINE_CODE_WIDTH: usize = 5;

/// One GenBank header field with its continuation lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField<'a> {
    pub keyword: &'a str,
    pub lines: Vec<&'a str>,
}

impl HeaderField<'_> {
    /// All lines joined with single spaces
    pub fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A GenBank/GenPept entry split into header fields, feature lines and sequence
#[derive(Debug, Clone, Default)]
pub struct GenbankEntry<'a> {
    pub fields: Vec<HeaderField<'a>>,
    pub feature_lines: Vec<&'a str>,
    pub sequence: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenbankSection {
    Header,
    Features,
    Origin,
}

impl<'a> GenbankEntry<'a> {
    pub fn scan(text: &'a str) -> Self {
        let mut entry = GenbankEntry::default();
        let mut section = GenbankSection::Header;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.starts_with("//") {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let starts_with_keyword = !line.starts_with(' ');
            if starts_with_keyword {
                let keyword = line.split_whitespace().next().unwrap_or("");
                section = match keyword {
                    "FEATURES" => GenbankSection::Features,
                    "ORIGIN" => GenbankSection::Origin,
                    _ => GenbankSection::Header,
                };
                if section != GenbankSection::Header {
                    continue;
                }
            }

            match section {
                GenbankSection::Features => entry.feature_lines.push(line),
                GenbankSection::Origin => entry
                    .sequence
                    .extend(line.chars().filter(|c| c.is_ascii_alphabetic() || *c == '*')),
                GenbankSection::Header => entry.push_header_line(line),
            }
        }

        entry
    }

    fn push_header_line(&mut self, line: &'a str) {
        let (prefix, value) = split_at_column(line, GENBANK_VALUE_COLUMN);
        let keyword = prefix.trim();
        if keyword.is_empty() {
            if let Some(last) = self.fields.last_mut() {
                last.lines.push(value);
            }
        } else {
            self.fields.push(HeaderField {
                keyword,
                lines: vec![value],
            });
        }
    }

    /// First field with the given keyword
    pub fn field(&self, keyword: &str) -> Option<&HeaderField<'a>> {
        self.fields.iter().find(|f| f.keyword == keyword)
    }

    /// Every field with the given keyword
    pub fn fields_named<'s>(
        &'s self,
        keyword: &'s str,
    ) -> impl Iterator<Item = &'s HeaderField<'a>> + 's {
        self.fields.iter().filter(move |f| f.keyword == keyword)
    }
}

/// An EMBL/UniProt entry as (line code, value) pairs plus its sequence
#[derive(Debug, Clone, Default)]
pub struct LineCodedEntry<'a> {
    pub lines: Vec<(&'a str, &'a str)>,
    pub sequence: String,
}

impl<'a> LineCodedEntry<'a> {
    pub fn scan(text: &'a str) -> Self {
        let mut entry = LineCodedEntry::default();
        let mut in_sequence = false;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.starts_with("//") {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if in_sequence && line.starts_with(' ') {
                entry
                    .sequence
                    .extend(line.chars().filter(|c| c.is_ascii_alphabetic() || *c == '*'));
                continue;
            }

            let (code, value) = split_at_column(line, LINE_CODE_WIDTH);
            let code = code.trim();
            in_sequence = code == "SQ";
            entry.lines.push((code, value));
        }

        entry
    }

    /// Values of every line with the given code
    pub fn values<'s>(&'s self, code: &'s str) -> impl Iterator<Item = &'a str> + 's {
        self.lines
            .iter()
            .filter(move |(c, _)| *c == code)
            .map(|(_, v)| *v)
    }

    /// First value with the given code
    pub fn first(&self, code: &str) -> Option<&'a str> {
        self.lines.iter().find(|(c, _)| *c == code).map(|(_, v)| *v)
    }

    /// Values with the given code joined by single spaces, if any
    pub fn joined(&self, code: &str) -> Option<String> {
        let parts: Vec<&str> = self
            .values(code)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// `FT` lines rewritten to the GenBank feature-table layout
    pub fn feature_lines(&self) -> Vec<String> {
        self.values("FT")
            .map(|v| format!("{}{}", " ".repeat(LINE_CODE_WIDTH), v))
            .collect()
    }
}

/// A feature as written in the file, before location parsing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFeature {
    pub key: String,
    /// Location text, continuation lines joined with spaces
    pub location: String,
    /// Qualifiers with quotes removed, in file order
    pub qualifiers: Vec<(String, String)>,
}

/// Qualifiers whose continuation lines join without a separator
const UNSPACED_QUALIFIERS: &[&str] = &["translation"];

/// Scan INSD feature-table lines (GenBank layout) into raw features
pub fn scan_features<I, S>(lines: I) -> Vec<RawFeature>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut features: Vec<RawFeature> = Vec::new();
    // Qualifier under construction: (name, value with quotes)
    let mut open: Option<(String, String)> = None;

    let close = |feature: Option<&mut RawFeature>, open: &mut Option<(String, String)>| {
        if let (Some(feature), Some((name, value))) = (feature, open.take()) {
            feature.qualifiers.push((name, unquote(&value)));
        }
    };

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let key_column = line.get(FEATURE_KEY_COLUMN..FEATURE_KEY_COLUMN + 1);
        let is_new_feature = line.starts_with("     ") && key_column.is_some_and(|c| c != " ");
        if is_new_feature {
            close(features.last_mut(), &mut open);
            let body = &line[FEATURE_KEY_COLUMN..];
            let (key, location) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
            features.push(RawFeature {
                key: key.to_string(),
                location: location.trim().to_string(),
                qualifiers: Vec::new(),
            });
            continue;
        }

        let Some(feature) = features.last_mut() else {
            continue;
        };
        let content = line.trim();

        let continues_value = open
            .as_ref()
            .is_some_and(|(_, value)| value.matches('"').count() % 2 == 1);

        if continues_value {
            if let Some((name, value)) = open.as_mut() {
                if !UNSPACED_QUALIFIERS.contains(&name.as_str()) {
                    value.push(' ');
                }
                value.push_str(content);
            }
        } else if let Some(qualifier) = content.strip_prefix('/') {
            close(Some(feature), &mut open);
            let (name, value) = qualifier.split_once('=').unwrap_or((qualifier, ""));
            open = Some((name.to_string(), value.to_string()));
        } else if open.is_some() {
            // Unquoted value spilling over a line
            if let Some((_, value)) = open.as_mut() {
                value.push(' ');
                value.push_str(content);
            }
        } else {
            feature.location.push(' ');
            feature.location.push_str(content);
        }
    }
    close(features.last_mut(), &mut open);

    features
}

/// Strip surrounding quotes and unescape doubled quotes
fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
        .unwrap_or(trimmed);
    inner.replace("\"\"", "\"")
}

/// Split a line at a column, tolerating short lines and multi-byte text
fn split_at_column(line: &str, column: usize) -> (&str, &str) {
    if line.len() <= column {
        return (line, "");
    }
    if line.is_char_boundary(column) {
        line.split_at(column)
    } else {
        (line, "")
    }
}
