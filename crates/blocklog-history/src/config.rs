use std::path::{Path, PathBuf};
use std::sync::Arc;

use blocklog_core::constants::DEFAULT_FLUSH_THRESHOLD;
use blocklog_persist::{ArchiveStore, Compression, Endianness, RecordCodec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse history config RON: {0}")]
    Parse(String),
}

/// History settings, loaded from RON.
///
/// ```ron
/// HistoryConfig(
///     base_path: "history",
///     endianness: Little,
///     compression: Gzip,
///     flush_threshold: 4096,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Root of the archive: `<base_path>/<world>/<player>/`.
    pub base_path: PathBuf,
    pub endianness: Endianness,
    pub compression: Compression,
    /// Buffered edits per world after which a periodic flush archives them.
    pub flush_threshold: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("history"),
            endianness: Endianness::default(),
            compression: Compression::default(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

impl HistoryConfig {
    /// Build the archive store these settings describe.
    pub fn open_store(&self) -> Arc<ArchiveStore> {
        Arc::new(ArchiveStore::new(
            self.base_path.clone(),
            RecordCodec::new(self.endianness),
            self.compression,
        ))
    }
}

/// Parse a history config from a RON string.
pub fn load_config_from_str(ron_str: &str) -> Result<HistoryConfig, ConfigError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Read and parse a history config file.
pub fn load_config(path: &Path) -> Result<HistoryConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let config = load_config_from_str(
            r#"HistoryConfig(
                base_path: "/srv/history",
                endianness: Big,
                compression: Lz4,
                flush_threshold: 16,
            )"#,
        )
        .expect("should parse");
        assert_eq!(config.base_path, PathBuf::from("/srv/history"));
        assert_eq!(config.endianness, Endianness::Big);
        assert_eq!(config.compression, Compression::Lz4);
        assert_eq!(config.flush_threshold, 16);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = load_config_from_str("(flush_threshold: 10)").expect("should parse");
        assert_eq!(config.base_path, PathBuf::from("history"));
        assert_eq!(config.endianness, Endianness::Little);
        assert_eq!(config.compression, Compression::Gzip);
        assert_eq!(config.flush_threshold, 10);
    }

    #[test]
    fn test_bad_ron_rejected() {
        let result = load_config_from_str("HistoryConfig(compression: Zstd)");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("history.ron");
        std::fs::write(&path, "(base_path: \"h\")").expect("write");
        let config = load_config(&path).expect("should load");
        assert_eq!(config.base_path, PathBuf::from("h"));

        let missing = load_config(&tmp.path().join("nope.ron"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_open_store_uses_settings() {
        let config = HistoryConfig {
            base_path: PathBuf::from("/tmp/x"),
            endianness: Endianness::Big,
            compression: Compression::Lz4,
            flush_threshold: 1,
        };
        let store = config.open_store();
        assert_eq!(store.base(), Path::new("/tmp/x"));
        assert_eq!(store.codec().endianness, Endianness::Big);
        assert_eq!(store.compression(), Compression::Lz4);
    }
}
