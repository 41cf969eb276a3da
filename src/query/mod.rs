//! Request orchestration: id → byte range → parsed record
//!
//! An [`Extractor`] strings the pieces together for each id:
//!
//! 1. locate the entry in the mirror's index partitions
//! 2. resolve the partition's reader type
//! 3. read the entry's byte range
//! 4. parse it with the reader type's record parser for the window
//!
//! Every id is handled independently. Only configuration failures (an
//! unknown reader type) abort a multi-id request; batches run through
//! [`BatchProcessor`].

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::batch::{BatchProcessor, BatchResult};
use crate::cli::process_input_line;
use crate::error::MirrorError;
use crate::location::Window;
use crate::mirror::MirrorResolver;
use crate::record::SequenceRecord;

/// How an inverted `start > stop` window is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// `[min, max]` of the two bounds
    #[default]
    Corrected,
    /// `[min, min]`, as older mirror front-ends computed it
    Legacy,
}

/// Normalize caller-supplied coordinates into a window
///
/// `0, 0` is the whole record. Otherwise the bounds are ordered according
/// to `mode` and a zero lower bound becomes 1.
///
/// # Errors
///
/// Returns [`MirrorError::InvalidWindow`] for negative coordinates.
///
/// # Example
///
/// ```
/// use ferro_mirror::query::{normalize_window, WindowMode};
/// use ferro_mirror::location::Window;
///
/// let window = normalize_window(50, 10, WindowMode::Corrected).unwrap();
/// assert_eq!(window, Window::new(10, 50));
/// ```
pub fn normalize_window(start: i64, stop: i64, mode: WindowMode) -> Result<Window, MirrorError> {
    if start < 0 || stop < 0 {
        return Err(MirrorError::InvalidWindow {
            msg: format!("negative coordinates {}..{}", start, stop),
        });
    }
    if start == 0 && stop == 0 {
        return Ok(Window::whole());
    }

    let (lo, hi) = match mode {
        WindowMode::Corrected => (start.min(stop), start.max(stop)),
        WindowMode::Legacy => {
            let lo = start.min(stop);
            let hi = lo.max(stop);
            if start > stop {
                log::warn!(
                    "Legacy window mode collapses inverted window {}..{} to {}..{}",
                    start,
                    stop,
                    lo,
                    hi
                );
            }
            (lo, hi)
        }
    };

    Ok(Window::new(lo.max(1), hi.max(1)))
}

/// A multi-id retrieval request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub ids: Vec<String>,
    pub window: Window,
    /// Readdress coordinates so the window starts at 1
    pub remap: bool,
}

impl FetchRequest {
    /// Whole-record request for `ids`
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            window: Window::whole(),
            remap: false,
        }
    }

    /// Restrict the request to `start..stop`, normalized with `mode`
    pub fn with_window(mut self, start: i64, stop: i64, mode: WindowMode) -> Result<Self, MirrorError> {
        self.window = normalize_window(start, stop, mode)?;
        Ok(self)
    }

    pub fn with_remap(mut self, remap: bool) -> Self {
        self.remap = remap;
        self
    }
}

/// Result of retrieving one id
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub id: String,
    pub result: Result<SequenceRecord, MirrorError>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Retrieves parsed records from a mirror
pub struct Extractor {
    resolver: MirrorResolver,
    window_mode: WindowMode,
}

impl Extractor {
    pub fn new(resolver: MirrorResolver) -> Self {
        Self {
            resolver,
            window_mode: WindowMode::default(),
        }
    }

    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    pub fn resolver(&self) -> &MirrorResolver {
        &self.resolver
    }

    pub fn window_mode(&self) -> WindowMode {
        self.window_mode
    }

    /// Retrieve one id for the caller's `start`/`stop` coordinates
    pub fn fetch(
        &self,
        id: &str,
        start: i64,
        stop: i64,
        remap: bool,
    ) -> Result<SequenceRecord, MirrorError> {
        let window = normalize_window(start, stop, self.window_mode)?;
        self.fetch_window(id, window, remap)
    }

    /// Retrieve one id for an already normalized window
    pub fn fetch_window(
        &self,
        id: &str,
        window: Window,
        remap: bool,
    ) -> Result<SequenceRecord, MirrorError> {
        let id = id.trim();
        let entry = self.resolver.locate(id)?;
        let reader_type = self.resolver.reader_type_for(&entry)?;
        let raw = self.resolver.extract_range(&entry)?;
        log::debug!(
            "{}: {} bytes from {} read as {}",
            id,
            raw.len(),
            entry.file.display(),
            reader_type
        );
        reader_type.record_format().parse(&raw, window, remap)
    }

    /// Retrieve every id of a request, in request order
    ///
    /// Per-id failures are reported in the outcomes; only a failure that
    /// is fatal for the batch (unknown reader type) aborts the request.
    pub fn fetch_batch(&self, request: &FetchRequest) -> Result<Vec<FetchOutcome>, MirrorError> {
        BatchProcessor::new(self)
            .fetch(request.ids.as_slice(), request.window, request.remap)
            .map(BatchResult::into_outcomes)
    }
}

/// Split a comma-separated id list
pub fn split_id_list(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one id per line from a file, gzip-compressed when it ends in `.gz`
///
/// Blank lines and `#` comments are skipped, as is a leading BOM.
pub fn read_id_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>, MirrorError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MirrorError::Io {
        msg: format!("Failed to open {}: {}", path.display(), e),
    })?;

    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|e| e == "gz") {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut ids = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| MirrorError::Io {
            msg: format!("Failed to read {}: {}", path.display(), e),
        })?;
        if let Some(id) = process_input_line(&line, n == 0) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::TempDir;

    #[rstest]
    #[case(0, 0, Window::whole())]
    #[case(10, 50, Window::new(10, 50))]
    #[case(50, 10, Window::new(10, 50))]
    #[case(0, 30, Window::new(1, 30))]
    #[case(7, 7, Window::new(7, 7))]
    fn test_normalize_corrected(#[case] start: i64, #[case] stop: i64, #[case] expected: Window) {
        assert_eq!(
            normalize_window(start, stop, WindowMode::Corrected).unwrap(),
            expected
        );
    }

    #[test]
    fn test_normalize_legacy_collapses_inverted() {
        assert_eq!(
            normalize_window(50, 10, WindowMode::Legacy).unwrap(),
            Window::new(10, 10)
        );
        assert_eq!(
            normalize_window(10, 50, WindowMode::Legacy).unwrap(),
            Window::new(10, 50)
        );
    }

    #[test]
    fn test_normalize_negative() {
        let err = normalize_window(-1, 10, WindowMode::Corrected).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidWindow { .. }));
    }

    #[test]
    fn test_split_id_list() {
        assert_eq!(split_id_list("A1, B2,,C3 "), vec!["A1", "B2", "C3"]);
        assert!(split_id_list(" , ").is_empty());
    }

    #[test]
    fn test_read_id_list_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "\u{feff}X56734\n\n# comment\nP12345  # sprot\n").unwrap();
        assert_eq!(read_id_list(&path).unwrap(), vec!["X56734", "P12345"]);
    }

    #[test]
    fn test_read_id_list_gz() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"A1\nB2\n").unwrap();
        encoder.finish().unwrap();
        assert_eq!(read_id_list(&path).unwrap(), vec!["A1", "B2"]);
    }

    #[test]
    fn test_fetch_request_builder() {
        let request = FetchRequest::new(["A1", "B2"])
            .with_window(30, 20, WindowMode::Corrected)
            .unwrap()
            .with_remap(true);
        assert_eq!(request.ids.len(), 2);
        assert_eq!(request.window, Window::new(20, 30));
        assert!(request.remap);
    }
}
