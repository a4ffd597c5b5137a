pub mod archive;
pub mod codec;
pub mod compress;
pub mod error;
pub mod format;
pub mod inspect;
pub mod layout;

pub use archive::{ArchiveStore, RedoTrail};
pub use codec::RecordCodec;
pub use error::PersistError;
pub use format::{Compression, ConsumedEdits, Endianness, HistoryRecord, RedoRecord};
pub use inspect::{summarize_segments, SegmentSummary};
