//! Batch retrieval of many ids from a mirror.
//!
//! Ids are retrieved one after the other, each independently: a missing id
//! or an unreadable entry is recorded in the [`BatchResult`] and the batch
//! goes on. Only an unknown reader type or a configuration error, which
//! point at a broken mirror setup, abort it.
//!
//! [`Extractor::fetch_batch`](crate::query::Extractor::fetch_batch) runs
//! through the same processor.
//!
//! # Example
//!
//! ```no_run
//! use ferro_mirror::batch::BatchProcessor;
//! use ferro_mirror::location::Window;
//! use ferro_mirror::mirror::{MirrorResolver, ReaderDescriptor, TsvIndexPartition};
//! use ferro_mirror::query::Extractor;
//!
//! let resolver = MirrorResolver::new(vec![ReaderDescriptor::new("/mirror/embl", "embl")])
//!     .with_partition(TsvIndexPartition::open("/mirror/embl/embl.idx").unwrap());
//! let extractor = Extractor::new(resolver);
//!
//! let result = BatchProcessor::new(&extractor)
//!     .fetch_with_progress(&["X56734", "M10051"], Window::whole(), false, |progress| {
//!         println!("Progress: {:.1}%", progress.percent());
//!     })
//!     .unwrap();
//! println!("Retrieved {}/{} entries", result.success_count(), result.total());
//! ```

mod processor;

pub use processor::{BatchConfig, BatchProcessor, BatchProgress, BatchResult};
