use blocklog_core::types::{BlockId, CellMap, CellPos, Tick};
use serde::{Deserialize, Serialize};

/// File extension of history segments (edits available to undo).
pub const HISTORY_EXTENSION: &str = "bch";

/// File extension of redo trails (values overwritten by an undo).
pub const REDO_EXTENSION: &str = "bcf";

/// Suffix appended while a segment is being rewritten.
pub const TEMP_SUFFIX: &str = "tmp";

/// History record: tick (8) + x, z, y (2 each) + old (1) + new (1).
pub const HISTORY_RECORD_SIZE: usize = 16;

/// Redo-trail record: x, z, y (2 each) + block (1). Recency comes from the file name.
pub const REDO_RECORD_SIZE: usize = 7;

/// Byte order of every multi-byte field in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Compression applied to whole segment files.
///
/// Gzip is the on-disk format; LZ4 trades ratio for speed on busy servers.
/// A store must be read with the compression it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    Gzip,
    Lz4,
}

/// One archived edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub time: Tick,
    pub pos: CellPos,
    pub old: BlockId,
    pub new: BlockId,
}

/// One redo-trail entry: the value a cell held before an undo overwrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedoRecord {
    pub pos: CellPos,
    pub block: BlockId,
}

/// Edits taken out of a history by an undo.
///
/// `records` lets a failed undo put the edits back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedEdits {
    /// Per position, tick and old value of the earliest consumed edit.
    pub cells: CellMap,
    /// The consumed records, oldest first.
    pub records: Vec<HistoryRecord>,
}
