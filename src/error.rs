//! Error types for ferro-mirror
//!
//! This module provides error handling with:
//! - Error codes for categorization
//! - Source span tracking for location-expression errors
//! - A classification of which failures abort a whole request
//!
//! Failure taxonomy:
//! - id-not-found: reported per id, never aborts a batch
//! - malformed location: the owning feature is dropped, the record survives
//! - missing field: recovered locally with a placeholder, never surfaced
//! - I/O failure during byte-range extraction: fatal for one entry only
//! - unknown reader type: fatal for the whole request

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Parse errors (E1xxx)
    /// Location expression could not be parsed
    InvalidLocation = 1001,
    /// Location uses a construct we refuse to guess at (nested compounds)
    UnsupportedLocation = 1002,

    // Lookup errors (E2xxx)
    /// Sequence id absent from every index partition
    IdNotFound = 2001,
    /// Reader type tag not in the closed vocabulary
    UnknownReaderType = 2002,
    /// Dictionary lookup failed
    DictionaryLookup = 2003,

    // Window errors (E3xxx)
    /// Coordinate window is not usable
    InvalidWindow = 3001,

    // IO and configuration errors (E9xxx)
    /// Byte range could not be read from a mirrored file
    RetrievalFailed = 9001,
    /// File IO error
    IoError = 9002,
    /// JSON serialization error
    JsonError = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A span in the source input indicating error location
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Starting byte offset (0-indexed)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span for a single position
    pub fn point(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Format the source with the error highlighted
    ///
    /// Returns a string like:
    /// ```text
    /// join(1..10,20..x)
    ///                ^
    /// ```
    pub fn highlight(&self, source: &str) -> String {
        if source.is_empty() {
            return String::new();
        }

        let safe_start = self.start.min(source.len());
        let safe_end = self.end.min(source.len()).max(safe_start);

        let mut pointer = " ".repeat(safe_start);
        pointer.push('^');
        if safe_end > safe_start + 1 {
            pointer.push_str(&"~".repeat(safe_end - safe_start - 1));
        }

        format!("{}\n{}", source, pointer)
    }
}

/// Main error type for ferro-mirror operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MirrorError {
    /// Parse error with position and message
    #[error("Parse error at position {pos}: {msg}")]
    Parse { pos: usize, msg: String },

    /// Location is syntactically valid but deliberately unsupported
    #[error("Unsupported location for {id}: {location} ({reason})")]
    UnsupportedLocation {
        id: String,
        location: String,
        reason: String,
    },

    /// Sequence id absent from every index partition
    #[error("Sequence id not found: {id}")]
    IdNotFound { id: String },

    /// Reader type tag outside the known vocabulary
    #[error("Unknown reader type: {tag}")]
    UnknownReaderType { tag: String },

    /// Byte range could not be read from the mirrored file
    #[error("Unable to retrieve {id} from {file} [{start}, {end}]: {msg}")]
    Retrieval {
        id: String,
        file: String,
        start: u64,
        end: u64,
        msg: String,
    },

    /// Coordinate window is unusable
    #[error("Invalid window: {msg}")]
    InvalidWindow { msg: String },

    /// Dictionary index could not be read or queried
    #[error("Dictionary error: {msg}")]
    Dictionary { msg: String },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON serialization error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl MirrorError {
    /// Create a simple parse error
    pub fn parse(pos: usize, msg: impl Into<String>) -> Self {
        MirrorError::Parse {
            pos,
            msg: msg.into(),
        }
    }

    /// Create an unsupported-location error
    pub fn unsupported(
        id: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MirrorError::UnsupportedLocation {
            id: id.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            MirrorError::Parse { .. } => ErrorCode::InvalidLocation,
            MirrorError::UnsupportedLocation { .. } => ErrorCode::UnsupportedLocation,
            MirrorError::IdNotFound { .. } => ErrorCode::IdNotFound,
            MirrorError::UnknownReaderType { .. } => ErrorCode::UnknownReaderType,
            MirrorError::Retrieval { .. } => ErrorCode::RetrievalFailed,
            MirrorError::InvalidWindow { .. } => ErrorCode::InvalidWindow,
            MirrorError::Dictionary { .. } => ErrorCode::DictionaryLookup,
            MirrorError::Config { .. } => ErrorCode::ConfigError,
            MirrorError::Io { .. } => ErrorCode::IoError,
            MirrorError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Whether this error must abort a multi-id request.
    ///
    /// Only configuration and index-integrity problems qualify; data problems
    /// affect a single id.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            MirrorError::UnknownReaderType { .. } | MirrorError::Config { .. }
        )
    }

    /// Get a formatted error with the location source highlighted
    pub fn detailed_message(&self, source: &str) -> String {
        match self {
            MirrorError::Parse { pos, .. } => format!(
                "[{}] {}\n\n{}",
                self.code(),
                self,
                SourceSpan::point(*pos).highlight(source)
            ),
            _ => format!("[{}] {}", self.code(), self),
        }
    }
}

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        MirrorError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MirrorError {
    fn from(err: toml::de::Error) -> Self {
        MirrorError::Config {
            msg: err.to_string(),
        }
    }
}
