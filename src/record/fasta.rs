//! FASTA entries from BLAST-formatted partitions

use crate::location::Window;
use crate::record::model::{FeatureTable, MoleculeKind, SequenceInfo, SequenceRecord, NOT_SPECIFIED};
use crate::record::{decode, slice_sequence, RecordParser};
use crate::Result;

/// Parser for FASTA entries; `protein` for `blastp` partitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastaParser {
    pub protein: bool,
}

/// Molecule flavour of a nucleotide sequence: `RNA` when it has `U` but no `T`
fn nucleic_flavour(sequence: &str) -> &'static str {
    let has_u = sequence.bytes().any(|b| b.eq_ignore_ascii_case(&b'U'));
    let has_t = sequence.bytes().any(|b| b.eq_ignore_ascii_case(&b'T'));
    if has_u && !has_t {
        "RNA"
    } else {
        "DNA"
    }
}

impl RecordParser for FastaParser {
    fn parse(&self, raw: &[u8], window: Window, _remap: bool) -> Result<SequenceRecord> {
        let text = decode(raw);
        let mut lines = text.lines();

        let header = lines
            .by_ref()
            .find(|l| !l.trim().is_empty())
            .and_then(|l| l.trim().strip_prefix('>'))
            .unwrap_or_default();
        let (id, description) = match header.split_once(char::is_whitespace) {
            Some((id, description)) => (id, description.trim()),
            None => (header, ""),
        };

        let sequence: String = lines
            .flat_map(str::chars)
            .filter(|c| c.is_ascii_alphabetic() || *c == '*' || *c == '-')
            .collect();

        let kind = if self.protein {
            MoleculeKind::Proteic
        } else {
            MoleculeKind::Nucleic
        };
        let id = if id.is_empty() { NOT_SPECIFIED } else { id };
        let mut info = SequenceInfo::new(id, kind);
        if !description.is_empty() {
            info.description = description.to_string();
        }
        info.molecule_type = if self.protein {
            "protein"
        } else {
            nucleic_flavour(&sequence)
        }
        .to_string();
        info.length = sequence.len() as u64;

        Ok(SequenceRecord {
            sequence: slice_sequence(&sequence, window),
            info,
            features: FeatureTable::new(),
        })
    }
}
