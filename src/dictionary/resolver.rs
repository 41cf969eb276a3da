//! Term resolution with per-dictionary fallbacks

use std::collections::HashSet;

use crate::dictionary::index::TermIndex;
use crate::dictionary::{DicoKind, DicoTerm};
use crate::error::MirrorError;

/// Value reported for ids that do not resolve
pub const UNKNOWN_TERM: &str = "unknown";

/// Namespace prefix of Gene Ontology ids
const GO_PREFIX: &str = "GO:";

/// Resolves ids against a borrowed term index
#[derive(Debug)]
pub struct DictionaryResolver<'h, I: TermIndex> {
    index: &'h I,
}

impl<'h, I: TermIndex> DictionaryResolver<'h, I> {
    pub fn new(index: &'h I) -> Self {
        Self { index }
    }

    /// Resolve an id, falling back when the exact lookup misses
    ///
    /// - taxonomy: the query is treated as an organism name and the best
    ///   ranked match is returned
    /// - Gene Ontology: the lookup is retried with the `GO:` prefix
    pub fn resolve(&self, kind: DicoKind, id: &str) -> Result<Option<DicoTerm>, MirrorError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        if let Some(term) = self.index.get(kind, id)? {
            return Ok(Some(term));
        }

        match kind {
            DicoKind::Taxonomy | DicoKind::NcbiTaxonomy => {
                Ok(self.index.search(kind, id, 1)?.into_iter().next())
            }
            DicoKind::GeneOntology if !id.starts_with(GO_PREFIX) => {
                self.index.get(kind, &format!("{}{}", GO_PREFIX, id))
            }
            _ => Ok(None),
        }
    }

    /// Root-to-leaf lineage of a taxonomy id, `;`-joined
    ///
    /// The walk stops at a self-parented root (not included) or at a term
    /// already visited.
    pub fn lineage(&self, id: &str) -> Result<Option<String>, MirrorError> {
        let kind = if self.index.get(DicoKind::Taxonomy, id)?.is_some() {
            DicoKind::Taxonomy
        } else {
            DicoKind::NcbiTaxonomy
        };

        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.index.get(kind, id)?;

        while let Some(term) = current {
            if !seen.insert(term.id.clone()) {
                log::warn!("Taxonomy cycle at {} while building lineage of {}", term.id, id);
                break;
            }
            let parent = term.parent_id.clone();
            if parent.as_deref() == Some(term.id.as_str()) {
                break;
            }
            names.push(term.data_field);
            current = match parent {
                Some(parent) => self.index.get(kind, &parent)?,
                None => None,
            };
        }

        if names.is_empty() {
            return Ok(None);
        }
        names.reverse();
        Ok(Some(names.join(";")))
    }

    /// Answer a comma-separated id list, one `id<TAB>value` line per id
    ///
    /// Unresolved ids get [`UNKNOWN_TERM`].
    pub fn query_lines(&self, kind: DicoKind, ids: &str) -> Result<Vec<String>, MirrorError> {
        ids.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                let value = self
                    .resolve(kind, id)?
                    .map(|t| t.data_field)
                    .unwrap_or_else(|| UNKNOWN_TERM.to_string());
                Ok(format!("{}\t{}", id, value))
            })
            .collect()
    }
}
