//! Output formatting utilities for CLI operations

use crate::error::MirrorError;
use crate::record::{SequenceRecord, DATE_NOT_SPECIFIED};
use std::io::{self, Write};
use std::str::FromStr;

/// Residues per sequence line
pub const LINE_WIDTH: usize = 60;

/// Output format for retrieved records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// FASTA (default)
    #[default]
    Fasta,
    /// Line-oriented INSD-like dump
    Insd,
    /// JSON, one record per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_mirror::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    /// assert_eq!(OutputFormat::from_str("insd").unwrap(), OutputFormat::Insd);
    /// assert_eq!(OutputFormat::from_str("fasta").unwrap(), OutputFormat::Fasta);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "insd" | "flat" | "genbank" => OutputFormat::Insd,
            _ => OutputFormat::Fasta,
        })
    }
}

/// Write a record in the requested format
pub fn write_record<W: Write>(
    writer: &mut W,
    record: &SequenceRecord,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Fasta => write_fasta(writer, record),
        OutputFormat::Insd => write_insd(writer, record),
        OutputFormat::Json => write_json(writer, record),
    }
}

/// Write a record as FASTA, wrapped at [`LINE_WIDTH`] residues
///
/// # Examples
///
/// ```
/// use ferro_mirror::cli::write_fasta;
/// use ferro_mirror::record::{FeatureTable, MoleculeKind, SequenceInfo, SequenceRecord};
///
/// let mut info = SequenceInfo::new("X1", MoleculeKind::Nucleic);
/// info.description = "test".to_string();
/// let record = SequenceRecord { info, features: FeatureTable::new(), sequence: "ACGT".into() };
///
/// let mut buffer = Vec::new();
/// write_fasta(&mut buffer, &record).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), ">X1 test\nACGT\n");
/// ```
pub fn write_fasta<W: Write>(writer: &mut W, record: &SequenceRecord) -> io::Result<()> {
    writeln!(writer, ">{} {}", record.info.id, record.info.description)?;
    write_wrapped(writer, &record.sequence, "")
}

/// Write a record as a line-oriented INSD-like dump
///
/// Header fields first, then the feature table with one qualifier per
/// line, then the sequence, terminated by `//`.
pub fn write_insd<W: Write>(writer: &mut W, record: &SequenceRecord) -> io::Result<()> {
    let info = &record.info;
    writeln!(
        writer,
        "{:<12}{} {} {} {} {}",
        "LOCUS", info.id, info.length, info.molecule_type, info.topology, info.division
    )?;
    writeln!(writer, "{:<12}{}", "DEFINITION", info.description)?;
    writeln!(writer, "{:<12}{}", "MOLECULE", info.molecule_kind)?;
    writeln!(writer, "{:<12}{}", "CREATED", format_date(info.creation_date))?;
    writeln!(writer, "{:<12}{}", "UPDATED", format_date(info.update_date))?;
    writeln!(writer, "{:<12}{}", "ORGANISM", info.organism)?;
    writeln!(writer, "{:<12}{}", "TAXONOMY", info.taxonomy)?;

    writeln!(writer, "{:<21}Location/Qualifiers", "FEATURES")?;
    for feature in &record.features.features {
        writeln!(writer, "     {:<16}{}", feature.key, feature.location)?;
        for qualifier in &feature.qualifiers {
            writeln!(
                writer,
                "{:<21}/{}=\"{}\"",
                "",
                qualifier.name,
                qualifier.value.replace('"', "\"\"")
            )?;
        }
    }

    writeln!(writer, "ORIGIN")?;
    write_wrapped(writer, &record.sequence, "     ")?;
    writeln!(writer, "//")
}

/// Write a record as one line of JSON
pub fn write_json<W: Write>(writer: &mut W, record: &SequenceRecord) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writeln!(writer)
}

/// Write the notice for an id that could not be retrieved
///
/// # Examples
///
/// ```
/// use ferro_mirror::cli::{write_failure, OutputFormat};
/// use ferro_mirror::MirrorError;
///
/// let mut buffer = Vec::new();
/// let error = MirrorError::IdNotFound { id: "X9".to_string() };
/// write_failure(&mut buffer, "X9", &error, OutputFormat::Fasta).unwrap();
/// assert!(String::from_utf8(buffer).unwrap().contains("unable to retrieve X9"));
/// ```
pub fn write_failure<W: Write>(
    writer: &mut W,
    id: &str,
    error: &MirrorError,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let notice = serde_json::json!({
                "id": id,
                "error": error.to_string(),
                "code": error.code().as_str(),
                "status": "unable to retrieve",
            });
            serde_json::to_writer(&mut *writer, &notice)?;
            writeln!(writer)
        }
        OutputFormat::Fasta | OutputFormat::Insd => {
            writeln!(writer, "# unable to retrieve {}: {}", id, error)
        }
    }
}

fn write_wrapped<W: Write>(writer: &mut W, sequence: &str, indent: &str) -> io::Result<()> {
    // Residues are ASCII after parsing
    for chunk in sequence.as_bytes().chunks(LINE_WIDTH) {
        writer.write_all(indent.as_bytes())?;
        writer.write_all(chunk)?;
        writeln!(writer)?;
    }
    Ok(())
}

fn format_date(date: u32) -> String {
    if date == DATE_NOT_SPECIFIED {
        "?".to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::parse_location;
    use crate::record::{Feature, FeatureTable, MoleculeKind, SequenceInfo};

    fn record(sequence: &str) -> SequenceRecord {
        let mut info = SequenceInfo::new("AB000001", MoleculeKind::Nucleic);
        info.description = "Test entry".to_string();
        info.molecule_type = "DNA".to_string();
        info.topology = "linear".to_string();
        info.length = sequence.len() as u64;
        info.creation_date = 19990621;
        let mut features = FeatureTable::new();
        let mut cds = Feature::new(
            "CDS",
            parse_location("complement(join(1..3,7..9))", "AB000001", 0).unwrap(),
        );
        cds.add_qualifier("product", "say \"hi\"");
        features.push(cds);
        SequenceRecord {
            info,
            features,
            sequence: sequence.to_string(),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("flat").unwrap(), OutputFormat::Insd);
        assert_eq!(OutputFormat::from_str("").unwrap(), OutputFormat::Fasta);
        assert_eq!(OutputFormat::default(), OutputFormat::Fasta);
    }

    #[test]
    fn test_fasta_wraps_at_sixty() {
        let mut buffer = Vec::new();
        write_fasta(&mut buffer, &record(&"A".repeat(130))).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ">AB000001 Test entry");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_fasta_empty_sequence() {
        let mut buffer = Vec::new();
        write_fasta(&mut buffer, &record("")).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), ">AB000001 Test entry\n");
    }

    #[test]
    fn test_insd_dump() {
        let mut buffer = Vec::new();
        write_insd(&mut buffer, &record("ACGTACGTA")).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("LOCUS       AB000001 9 DNA linear ?\n"));
        assert!(text.contains("CREATED     19990621\n"));
        assert!(text.contains("UPDATED     ?\n"));
        assert!(text.contains("     CDS             complement(join(1..3,7..9))\n"));
        assert!(text.contains("/product=\"say \"\"hi\"\"\"\n"));
        assert!(text.ends_with("ORIGIN\n     ACGTACGTA\n//\n"));
    }

    #[test]
    fn test_json_is_one_line() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &record("ACGT")).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["info"]["id"], "AB000001");
        assert_eq!(value["sequence"], "ACGT");
    }

    #[test]
    fn test_failure_json_escaping() {
        let mut buffer = Vec::new();
        let error = MirrorError::IdNotFound {
            id: "a\"b".to_string(),
        };
        write_failure(&mut buffer, "a\"b\n", &error, OutputFormat::Json).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["id"], "a\"b\n");
        assert_eq!(value["code"], "E2001");
        assert_eq!(value["status"], "unable to retrieve");
        assert_eq!(value["error"], "Sequence id not found: a\"b");
    }
}
