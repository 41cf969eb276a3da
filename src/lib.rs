// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-mirror: sequence databank mirror entry extraction
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Given a sequence id, the entry is located in the mirror's index
//! partitions, its bytes are read from the mirrored flat file, and the
//! entry is parsed into a [`SequenceRecord`]: identification metadata, a
//! feature table with typed locations, and the sequence, optionally
//! restricted to a coordinate window.
//!
//! # Example
//!
//! ```
//! use ferro_mirror::location::{clip, parse_location, Strand, Window};
//!
//! let location = parse_location("complement(join(10..20,30..40))", "X56734", 0).unwrap();
//! assert_eq!(location.strand, Strand::Minus);
//! // Minus strand compound ranges are stored 5' to 3'
//! assert_eq!(location.ranges()[0].begin(), 30);
//!
//! let clipped = clip(&location, Window::new(15, 35)).unwrap();
//! assert_eq!(clipped.to_string(), "complement(join(<15..20,30..>35))");
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod location;
pub mod mirror;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod query;
pub mod record;
pub mod xref;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use error::{ErrorCode, MirrorError};
pub use location::{parse_location, FeatureLocation, Strand, Window};
pub use mirror::{MirrorResolver, ReaderDescriptor, ReaderType};
pub use query::{normalize_window, Extractor, FetchRequest, WindowMode};
pub use record::{Feature, FeatureTable, RecordFormat, SequenceInfo, SequenceRecord};

/// Result type alias for ferro-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;
