//! Configuration file support for ferro-mirror.
//!
//! A mirror is described by a TOML file naming its index partitions, the
//! reader descriptors assigning a reader type to each partition path, the
//! dictionary directory and the window normalization mode.
//!
//! # Example Configuration
//!
//! ```toml
//! window_mode = "corrected"
//! partitions = ["/mirror/embl/embl01.idx", "/mirror/uniprot/sprot.idx"]
//!
//! [[readers]]
//! path_prefix = "/mirror/embl"
//! reader_type = "embl"
//!
//! [[readers]]
//! path_prefix = "/mirror/uniprot"
//! reader_type = "uniprot"
//!
//! [dictionaries]
//! dir = "/mirror/dico"
//! ```
//!
//! # Config File Locations
//!
//! Without an explicit path, configuration is searched in this order
//! (first found wins):
//! 1. `.ferro-mirror.toml` in current directory
//! 2. `~/.config/ferro/mirror.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dictionary::{DictionaryHandle, TsvTermIndex};
use crate::error::MirrorError;
use crate::mirror::{resolve_reader_type, MirrorResolver, ReaderDescriptor, ReaderType, TsvIndexPartition};
use crate::query::{Extractor, WindowMode};

/// File name searched in the current directory
pub const LOCAL_CONFIG: &str = ".ferro-mirror.toml";

/// Mirror configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MirrorConfig {
    /// Normalization of inverted windows
    #[serde(default)]
    pub window_mode: WindowMode,
    /// Index partitions, searched in order
    #[serde(default)]
    pub partitions: Vec<PathBuf>,
    /// Reader type per partition path prefix
    #[serde(default)]
    pub readers: Vec<ReaderDescriptor>,
    /// Dictionary store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionaries: Option<DictionaryConfig>,
}

/// Dictionary store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DictionaryConfig {
    /// Directory holding `<kind>.tsv` files
    pub dir: PathBuf,
}

impl MirrorConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, MirrorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MirrorError::Config {
            msg: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content
    pub fn parse(content: &str) -> Result<Self, MirrorError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), MirrorError> {
        let content = toml::to_string_pretty(self).map_err(|e| MirrorError::Config {
            msg: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| MirrorError::Config {
            msg: format!("Failed to write {}: {}", path.display(), e),
        })
    }

    /// Load from `path`, or from the default locations when `None`
    ///
    /// Falls back to an empty configuration when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self, MirrorError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let candidates = [
            Some(PathBuf::from(LOCAL_CONFIG)),
            dirs_home().map(|home| home.join(".config").join("ferro").join("mirror.toml")),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                log::debug!("Using configuration {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        log::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// An example configuration covering every reader type
    pub fn sample() -> Self {
        let readers = ReaderType::ALL
            .into_iter()
            .map(|t| ReaderDescriptor::new(format!("/data/mirror/{}", t.tag()), t.tag()))
            .collect();
        Self {
            window_mode: WindowMode::Corrected,
            partitions: vec![
                PathBuf::from("/data/mirror/genbank/gb01.idx"),
                PathBuf::from("/data/mirror/uniprot/sprot.idx"),
            ],
            readers,
            dictionaries: Some(DictionaryConfig {
                dir: PathBuf::from("/data/mirror/dico"),
            }),
        }
    }

    /// Validate configuration
    ///
    /// Every reader tag must be known and every partition must resolve to
    /// a reader type, so that misconfiguration fails before any lookup.
    pub fn validate(&self) -> Result<(), MirrorError> {
        for reader in &self.readers {
            if reader.path_prefix.trim().is_empty() {
                return Err(MirrorError::Config {
                    msg: format!("Reader '{}' has an empty path prefix", reader.reader_type),
                });
            }
            reader
                .reader_type
                .parse::<ReaderType>()
                .map_err(|e| MirrorError::Config { msg: e.to_string() })?;
        }

        for partition in &self.partitions {
            resolve_reader_type(partition, &self.readers).map_err(|_| MirrorError::Config {
                msg: format!("No reader declared for partition {}", partition.display()),
            })?;
        }

        Ok(())
    }

    /// Open every partition and build a resolver
    pub fn build_resolver(&self) -> Result<MirrorResolver, MirrorError> {
        self.validate()?;
        let mut resolver = MirrorResolver::new(self.readers.clone());
        for path in &self.partitions {
            resolver.add_partition(TsvIndexPartition::open(path)?);
        }
        Ok(resolver)
    }

    /// Build an extractor over the configured mirror
    pub fn build_extractor(&self) -> Result<Extractor, MirrorError> {
        Ok(Extractor::new(self.build_resolver()?).with_window_mode(self.window_mode))
    }

    /// Open the configured dictionary store
    pub fn open_dictionaries(&self) -> Result<DictionaryHandle<TsvTermIndex>, MirrorError> {
        let config = self.dictionaries.as_ref().ok_or_else(|| MirrorError::Config {
            msg: "No dictionary directory configured".to_string(),
        })?;
        DictionaryHandle::open(&config.dir)
    }
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXAMPLE: &str = r#"
window_mode = "legacy"
partitions = ["/mirror/embl/embl01.idx"]

[[readers]]
path_prefix = "/mirror/embl"
reader_type = "embl"

[dictionaries]
dir = "/mirror/dico"
"#;

    #[test]
    fn test_parse_config() {
        let config = MirrorConfig::parse(EXAMPLE).unwrap();
        assert_eq!(config.window_mode, WindowMode::Legacy);
        assert_eq!(config.partitions.len(), 1);
        assert_eq!(config.readers[0].reader_type, "embl");
        assert_eq!(
            config.dictionaries.unwrap().dir,
            PathBuf::from("/mirror/dico")
        );
    }

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::parse("").unwrap();
        assert_eq!(config.window_mode, WindowMode::Corrected);
        assert!(config.partitions.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml() {
        let err = MirrorConfig::parse("window_mode = ").unwrap_err();
        assert!(matches!(err, MirrorError::Config { .. }));
        assert!(err.is_fatal_for_batch());
    }

    #[test]
    fn test_validate_unknown_reader() {
        let mut config = MirrorConfig::parse(EXAMPLE).unwrap();
        config.readers[0].reader_type = "swissprot".to_string();
        assert!(matches!(config.validate(), Err(MirrorError::Config { .. })));
    }

    #[test]
    fn test_validate_partition_without_reader() {
        let mut config = MirrorConfig::parse(EXAMPLE).unwrap();
        config.partitions.push(PathBuf::from("/elsewhere/p.idx"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("/elsewhere/p.idx"));
    }

    #[test]
    fn test_sample_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mirror.toml");
        let sample = MirrorConfig::sample();
        assert!(sample.validate().is_ok());
        sample.to_file(&path).unwrap();
        assert_eq!(MirrorConfig::from_file(&path).unwrap(), sample);
    }

    #[test]
    fn test_missing_dictionaries() {
        let config = MirrorConfig::default();
        assert!(matches!(
            config.open_dictionaries(),
            Err(MirrorError::Config { .. })
        ));
    }
}
