use std::path::PathBuf;

/// Errors that can occur while reading or writing history files.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("corrupt segment {path}: {len} bytes is not a multiple of {record_size}-byte records")]
    CorruptSegment {
        path: PathBuf,
        len: usize,
        record_size: usize,
    },

    #[error("{len} bytes is not a multiple of {record_size}-byte records")]
    MisalignedRecords { len: usize, record_size: usize },

    #[error("history I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression failed: {0}")]
    Compress(String),

    #[error("decompression failed: {0}")]
    Decompress(String),

    #[error("invalid world name {0:?}")]
    InvalidWorldName(String),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
