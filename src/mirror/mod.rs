//! Mirror index resolution
//!
//! A mirror is a local copy of a databank split into flat files, with one
//! or more index partitions mapping sequence ids to byte ranges. Each
//! partition's path selects its [`ReaderType`] through the configured
//! [`ReaderDescriptor`]s.

pub mod index;
pub mod reader_type;
pub mod resolver;

pub use index::{IndexEntry, IndexPartition, MemoryIndexPartition, TsvIndexPartition};
pub use reader_type::{resolve_reader_type, ReaderDescriptor, ReaderType};
pub use resolver::MirrorResolver;
