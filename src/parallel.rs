//! Parallel retrieval support for ferro-mirror
//!
//! Whole requests are spread over a rayon thread pool; a single extraction
//! always runs on one thread. Enable with the `parallel` feature.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_mirror::location::Window;
//! use ferro_mirror::mirror::MirrorResolver;
//! use ferro_mirror::parallel::fetch_parallel;
//! use ferro_mirror::query::Extractor;
//!
//! let extractor = Extractor::new(MirrorResolver::new(vec![]));
//! let ids = vec!["X56734", "P99999"];
//! let results = fetch_parallel(&extractor, &ids, Window::whole(), false);
//! assert_eq!(results.len(), 2);
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::error::MirrorError;
use crate::location::Window;
use crate::query::Extractor;
use crate::record::SequenceRecord;

/// Retrieve ids in parallel
///
/// Returns one result per id; order is preserved.
pub fn fetch_parallel<S: AsRef<str> + Sync>(
    extractor: &Extractor,
    ids: &[S],
    window: Window,
    remap: bool,
) -> Vec<Result<SequenceRecord, MirrorError>> {
    ids.par_iter()
        .map(|id| extractor.fetch_window(id.as_ref(), window, remap))
        .collect()
}

/// Retrieve ids in parallel, keeping only the records found
pub fn fetch_parallel_ok<S: AsRef<str> + Sync>(
    extractor: &Extractor,
    ids: &[S],
    window: Window,
    remap: bool,
) -> Vec<SequenceRecord> {
    ids.par_iter()
        .filter_map(|id| extractor.fetch_window(id.as_ref(), window, remap).ok())
        .collect()
}

/// Statistics from parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelStats {
    /// Total ids processed
    pub total: usize,
    /// Records retrieved
    pub success: usize,
    /// Failed ids
    pub errors: usize,
}

impl ParallelStats {
    /// Tally a set of results
    pub fn from_results<T>(results: &[Result<T, MirrorError>]) -> Self {
        let success = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            success,
            errors: results.len() - success,
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::{MemoryIndexPartition, MirrorResolver, ReaderDescriptor};
    use tempfile::TempDir;

    fn extractor(dir: &TempDir, count: usize) -> Extractor {
        let mut content = String::new();
        let mut partition = MemoryIndexPartition::new(dir.path().join("nr.idx"));
        let data = dir.path().join("nr.fa");
        for i in 0..count {
            let start = content.len() as u64;
            content.push_str(&format!(">P{}\nMKV{}\n", i, "A".repeat(i % 7)));
            partition.insert(format!("P{}", i), &data, start, content.len() as u64 - 1);
        }
        std::fs::write(&data, content).unwrap();
        let descriptors = vec![ReaderDescriptor::new(dir.path().to_string_lossy(), "blastp")];
        Extractor::new(MirrorResolver::new(descriptors).with_partition(partition))
    }

    #[test]
    fn test_fetch_parallel_preserves_order() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, 200);
        let ids: Vec<String> = (0..200).map(|i| format!("P{}", i)).collect();

        let results = fetch_parallel(&extractor, &ids, Window::whole(), false);
        assert_eq!(results.len(), 200);
        for (i, result) in results.iter().enumerate() {
            let record = result.as_ref().unwrap();
            assert_eq!(record.info.id, format!("P{}", i));
            assert_eq!(record.info.molecule_type, "protein");
        }
    }

    #[test]
    fn test_fetch_parallel_ok_skips_missing() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, 3);
        let ids = ["P0", "missing", "P2"];
        assert_eq!(
            fetch_parallel_ok(&extractor, &ids, Window::whole(), false).len(),
            2
        );
        let stats = ParallelStats::from_results(&fetch_parallel(
            &extractor,
            &ids,
            Window::whole(),
            false,
        ));
        assert_eq!(stats.errors, 1);
        assert!((stats.success_rate() - 66.66).abs() < 0.1);
    }
}
