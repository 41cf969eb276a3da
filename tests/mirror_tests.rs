//! End-to-end retrieval through a mirror laid out on disk
//!
//! A temporary mirror is assembled from the fixture entries: flat files
//! holding several concatenated entries, tab-separated index partitions
//! and a TOML configuration tying partitions to reader types.

use ferro_mirror::batch::{BatchConfig, BatchProcessor};
use ferro_mirror::config::MirrorConfig;
use ferro_mirror::location::Window;
use ferro_mirror::query::{Extractor, FetchRequest, WindowMode};
use ferro_mirror::{MirrorError, ReaderType};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/entries/{}", name))
        .expect("Failed to read fixture entry")
}

/// Concatenate entries into `file` and write a partition index for them
fn write_partition(dir: &Path, file: &str, entries: &[(&str, String)]) -> PathBuf {
    let mut content = String::new();
    let mut index = String::from("# id\tfile\tstart\tend\n");
    for (id, text) in entries {
        let start = content.len();
        content.push_str(text);
        index.push_str(&format!("{}\t{}\t{}\t{}\n", id, file, start, content.len() - 1));
    }
    fs::write(dir.join(file), content).unwrap();

    let index_path = dir.join(format!("{}.idx", file));
    fs::write(&index_path, index).unwrap();
    index_path
}

struct Mirror {
    _dir: TempDir,
    config: MirrorConfig,
}

fn mirror() -> Mirror {
    let dir = TempDir::new().unwrap();
    let embl_dir = dir.path().join("embl");
    let sprot_dir = dir.path().join("uniprot");
    let gb_dir = dir.path().join("genbank");
    for d in [&embl_dir, &sprot_dir, &gb_dir] {
        fs::create_dir_all(d).unwrap();
    }

    let embl = fixture("x56734.embl");
    let second = embl.replace("X56734", "X56735");
    let embl_index = write_partition(
        &embl_dir,
        "embl01.dat",
        &[("X56734", embl), ("X56735", second)],
    );
    let sprot_index = write_partition(
        &sprot_dir,
        "sprot.dat",
        &[("TEST_MOUSE", fixture("test_mouse.dat"))],
    );
    let gb_index = write_partition(&gb_dir, "gb01.dat", &[("AB000263", fixture("ab000263.gb"))]);

    let toml = format!(
        r#"
partitions = ['{embl}', '{sprot}', '{gb}']

[[readers]]
path_prefix = '{embl_dir}'
reader_type = "embl"

[[readers]]
path_prefix = '{sprot_dir}'
reader_type = "uniprot"

[[readers]]
path_prefix = '{gb_dir}'
reader_type = "genbank"
"#,
        embl = embl_index.display(),
        sprot = sprot_index.display(),
        gb = gb_index.display(),
        embl_dir = embl_dir.display(),
        sprot_dir = sprot_dir.display(),
        gb_dir = gb_dir.display(),
    );
    let config_path = dir.path().join("mirror.toml");
    fs::write(&config_path, toml).unwrap();

    let config = MirrorConfig::from_file(&config_path).unwrap();
    Mirror { _dir: dir, config }
}

fn extractor(mirror: &Mirror) -> Extractor {
    mirror.config.build_extractor().unwrap()
}

#[test]
fn test_config_resolves_reader_types() {
    let mirror = mirror();
    assert!(mirror.config.validate().is_ok());

    let extractor = extractor(&mirror);
    let resolver = extractor.resolver();
    let entry = resolver.locate("TEST_MOUSE").unwrap();
    assert_eq!(resolver.reader_type_for(&entry).unwrap(), ReaderType::UniProt);
}

#[test]
fn test_fetch_second_entry_of_file() {
    let mirror = mirror();
    let record = extractor(&mirror).fetch("X56735", 0, 0, false).unwrap();
    assert_eq!(record.info.id, "X56735");
    assert_eq!(record.info.length, 40);
    assert_eq!(record.features.len(), 2);
}

#[test]
fn test_fetch_inverted_window_corrected() {
    let mirror = mirror();
    let record = extractor(&mirror).fetch("X56734", 30, 10, false).unwrap();
    assert_eq!(record.sequence.len(), 21);

    let source = record.features.by_key("source").next().unwrap();
    assert_eq!((source.from, source.to), (-10, -30));
}

#[test]
fn test_fetch_inverted_window_legacy() {
    let mut mirror = mirror();
    mirror.config.window_mode = WindowMode::Legacy;
    let record = extractor(&mirror).fetch("X56734", 30, 10, false).unwrap();
    assert_eq!(record.sequence.len(), 1);
}

#[test]
fn test_fetch_batch_reports_each_id() {
    let mirror = mirror();
    let extractor = extractor(&mirror);
    let request = FetchRequest::new(["AB000263", "NOPE", "TEST_MOUSE"])
        .with_window(1, 20, WindowMode::Corrected)
        .unwrap()
        .with_remap(true);

    let outcomes = extractor.fetch_batch(&request).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(MirrorError::IdNotFound { .. })
    ));

    let protein = outcomes[2].result.as_ref().unwrap();
    assert_eq!(protein.sequence, "MKVLAAGIVALLLAAGCSSS");
    let source = protein.features.by_key("source").next().unwrap();
    assert_eq!((source.from, source.to), (1, -20));
}

#[test]
fn test_truncated_file_is_retrieval_error() {
    let mirror = mirror();
    let extractor = extractor(&mirror);
    let entry = extractor.resolver().locate("X56735").unwrap();
    let file = fs::OpenOptions::new().write(true).open(&entry.file).unwrap();
    file.set_len(entry.start + 10).unwrap();

    let err = extractor.fetch("X56735", 0, 0, false).unwrap_err();
    assert!(matches!(err, MirrorError::Retrieval { .. }));
    assert!(!err.is_fatal_for_batch());
    // The first entry is still readable
    assert!(extractor.fetch("X56734", 0, 0, false).is_ok());
}

#[test]
fn test_batch_processor_over_mirror() {
    let mirror = mirror();
    let extractor = extractor(&mirror);
    let processor = BatchProcessor::with_config(&extractor, BatchConfig::new().progress_interval(1));

    let mut seen = Vec::new();
    let result = processor
        .fetch_with_progress(
            &["X56734", "X56735", "AB000263"],
            Window::whole(),
            false,
            |p| seen.push(p.processed),
        )
        .unwrap();
    assert!(result.all_ok());
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn test_partition_without_reader_fails_validation() {
    let mut mirror = mirror();
    mirror.config.readers.retain(|r| r.reader_type != "genbank");
    assert!(matches!(
        mirror.config.build_extractor(),
        Err(MirrorError::Config { .. })
    ));
}
