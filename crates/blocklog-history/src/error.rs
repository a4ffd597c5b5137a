use blocklog_persist::PersistError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by undo, redo and flush.
///
/// A failed undo or redo may be re-issued in full: cells already at their
/// target value are left alone.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
