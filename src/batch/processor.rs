//! Batch processor implementation.

use std::time::{Duration, Instant};

use crate::error::MirrorError;
use crate::location::Window;
use crate::query::{Extractor, FetchOutcome};
use crate::record::SequenceRecord;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Callback frequency (call progress callback every N items).
    pub progress_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            progress_interval: 100,
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the progress callback interval.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

/// Progress information for batch operations.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Total ids to retrieve.
    pub total: usize,
    /// Ids processed so far.
    pub processed: usize,
    /// Records retrieved so far.
    pub success: usize,
    /// Failed ids so far.
    pub errors: usize,
    /// Time elapsed since start.
    pub elapsed: Duration,
}

impl BatchProgress {
    /// Calculate completion percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    /// Calculate processing rate (items per second); 0.0 before any time has elapsed.
    pub fn items_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs < f64::EPSILON {
            0.0
        } else {
            self.processed as f64 / secs
        }
    }

    /// Estimate remaining time based on current rate.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        let rate = self.items_per_second();
        if rate == 0.0 {
            return None;
        }
        let remaining_items = self.total.saturating_sub(self.processed);
        Some(Duration::from_secs_f64(remaining_items as f64 / rate))
    }
}

/// Result of a batch operation.
#[derive(Debug)]
pub struct BatchResult {
    /// One outcome per id, in input order.
    pub outcomes: Vec<FetchOutcome>,
    /// Total processing time.
    pub duration: Duration,
}

impl BatchResult {
    /// Create a new batch result.
    pub fn new(outcomes: Vec<FetchOutcome>, duration: Duration) -> Self {
        Self { outcomes, duration }
    }

    /// Get the total number of items processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Get the number of successful items.
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Get the number of failed items.
    pub fn error_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Calculate success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            100.0
        } else {
            (self.success_count() as f64 / self.outcomes.len() as f64) * 100.0
        }
    }

    /// Get only successful records.
    pub fn successes(self) -> Vec<SequenceRecord> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .collect()
    }

    /// Get only the failed ids with their errors.
    pub fn errors(self) -> Vec<(String, MirrorError)> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.err().map(|e| (o.id, e)))
            .collect()
    }

    /// Check if all items were successful.
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_ok())
    }

    /// Check if any items failed.
    pub fn has_errors(&self) -> bool {
        !self.all_ok()
    }

    /// Hand the per-id outcomes over.
    pub fn into_outcomes(self) -> Vec<FetchOutcome> {
        self.outcomes
    }
}

/// Sequential batch retrieval with progress tracking.
///
/// Ids are processed in input order. Every per-id failure is recorded and
/// processing goes on; only a failure that is fatal for the batch (unknown
/// reader type, configuration) aborts it.
pub struct BatchProcessor<'e> {
    extractor: &'e Extractor,
    config: BatchConfig,
}

impl<'e> BatchProcessor<'e> {
    /// Create a new batch processor.
    pub fn new(extractor: &'e Extractor) -> Self {
        Self {
            extractor,
            config: BatchConfig::default(),
        }
    }

    /// Create a new batch processor with configuration.
    pub fn with_config(extractor: &'e Extractor, config: BatchConfig) -> Self {
        Self { extractor, config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Retrieve every id for a window.
    pub fn fetch<S: AsRef<str>>(
        &self,
        ids: &[S],
        window: Window,
        remap: bool,
    ) -> Result<BatchResult, MirrorError> {
        self.fetch_with_progress(ids, window, remap, |_| {})
    }

    /// Retrieve every id with a progress callback.
    pub fn fetch_with_progress<S, F>(
        &self,
        ids: &[S],
        window: Window,
        remap: bool,
        mut progress_fn: F,
    ) -> Result<BatchResult, MirrorError>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress),
    {
        let start = Instant::now();
        let total = ids.len();
        let interval = self.config.progress_interval.max(1);
        let mut outcomes = Vec::with_capacity(total);
        let mut success = 0;
        let mut errors = 0;

        for (i, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            let result = self.extractor.fetch_window(id, window, remap);
            match &result {
                Ok(_) => success += 1,
                Err(error) if error.is_fatal_for_batch() => {
                    log::error!("Aborting batch at {}: {}", id, error);
                    return Err(error.clone());
                }
                Err(error) => {
                    log::info!("{}: {}", id, error);
                    errors += 1;
                }
            }
            outcomes.push(FetchOutcome {
                id: id.to_string(),
                result,
            });

            if (i + 1) % interval == 0 || i + 1 == total {
                progress_fn(BatchProgress {
                    total,
                    processed: i + 1,
                    success,
                    errors,
                    elapsed: start.elapsed(),
                });
            }
        }

        Ok(BatchResult::new(outcomes, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::{MemoryIndexPartition, MirrorResolver, ReaderDescriptor};
    use tempfile::TempDir;

    const ENTRY: &str = ">X1 test sequence\nACGTACGTAC\n";

    fn extractor(dir: &TempDir, reader: &str) -> Extractor {
        let data = dir.path().join("db.fa");
        std::fs::write(&data, ENTRY).unwrap();
        let mut partition = MemoryIndexPartition::new(dir.path().join("db.idx"));
        partition.insert("X1", &data, 0, ENTRY.len() as u64 - 1);
        partition.insert("GONE", dir.path().join("gone.fa"), 0, 10);
        let descriptors = vec![ReaderDescriptor::new(dir.path().to_string_lossy(), reader)];
        Extractor::new(MirrorResolver::new(descriptors).with_partition(partition))
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new().progress_interval(50);
        assert_eq!(config.progress_interval, 50);
        assert_eq!(BatchConfig::new().progress_interval(0).progress_interval, 1);
    }

    #[test]
    fn test_batch_progress() {
        let progress = BatchProgress {
            total: 100,
            processed: 50,
            success: 45,
            errors: 5,
            elapsed: Duration::from_secs(1),
        };
        assert!((progress.percent() - 50.0).abs() < 0.01);
        assert!((progress.items_per_second() - 50.0).abs() < 0.01);
        let remaining = progress.estimated_remaining().unwrap();
        assert!((remaining.as_secs_f64() - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_fetch_batch_mixed() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, "blastn");
        let processor = BatchProcessor::new(&extractor);

        let ids = ["X1", "MISSING", "GONE", "X1"];
        let mut calls = 0;
        let result = processor
            .fetch_with_progress(&ids, Window::new(3, 6), false, |_| calls += 1)
            .unwrap();

        assert_eq!(result.total(), 4);
        assert_eq!(result.success_count(), 2);
        assert!(result.has_errors());
        assert!((result.success_rate() - 50.0).abs() < 0.01);
        assert!(calls > 0);

        let ids_in_order: Vec<&str> = result.outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids_in_order, ids);

        let records = result.successes();
        assert_eq!(records[0].sequence, "GTAC");
        assert_eq!(records[0].info.molecule_type, "DNA");
    }

    #[test]
    fn test_failures_never_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, "blastn");
        let result = BatchProcessor::new(&extractor)
            .fetch(&["MISSING", "GONE", "X1"], Window::whole(), false)
            .unwrap();
        assert_eq!(result.total(), 3);
        assert_eq!(result.error_count(), 2);

        let errors = result.errors();
        assert_eq!(errors[0].0, "MISSING");
        assert!(matches!(errors[0].1, MirrorError::IdNotFound { .. }));
        assert_eq!(errors[1].0, "GONE");
        assert!(matches!(errors[1].1, MirrorError::Retrieval { .. }));
    }

    #[test]
    fn test_unknown_reader_aborts() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, "swissprot");
        let processor = BatchProcessor::new(&extractor);
        let err = processor.fetch(&["X1"], Window::whole(), false).unwrap_err();
        assert!(matches!(err, MirrorError::UnknownReaderType { .. }));
    }

    #[test]
    fn test_empty_batch() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor(&dir, "blastn");
        let ids: Vec<&str> = vec![];
        let result = BatchProcessor::new(&extractor)
            .fetch(&ids, Window::whole(), false)
            .unwrap();
        assert_eq!(result.total(), 0);
        assert!(result.all_ok());
    }
}
