//! Scoped ownership of an opened term index

use std::path::Path;

use crate::dictionary::index::{TermIndex, TsvTermIndex};
use crate::dictionary::resolver::DictionaryResolver;
use crate::error::MirrorError;

/// An opened dictionary store
///
/// The underlying index is released when the handle is dropped. Resolvers
/// borrow the handle, so none can outlive it.
#[derive(Debug)]
pub struct DictionaryHandle<I: TermIndex> {
    name: String,
    index: I,
}

impl<I: TermIndex> DictionaryHandle<I> {
    pub fn new(name: impl Into<String>, index: I) -> Self {
        let name = name.into();
        log::debug!("Opened dictionary {}", name);
        Self { name, index }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// A resolver borrowing this handle
    pub fn resolver(&self) -> DictionaryResolver<'_, I> {
        DictionaryResolver::new(&self.index)
    }
}

impl DictionaryHandle<TsvTermIndex> {
    /// Open the TSV dictionaries stored in `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, MirrorError> {
        let dir = dir.as_ref();
        let index = TsvTermIndex::open(dir)?;
        Ok(Self::new(dir.display().to_string(), index))
    }
}

impl<I: TermIndex> Drop for DictionaryHandle<I> {
    fn drop(&mut self) {
        log::debug!("Released dictionary {}", self.name);
    }
}
