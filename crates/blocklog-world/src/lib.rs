pub mod memory;

use blocklog_core::types::{BlockId, CellPos};

pub use memory::MemoryWorld;

/// The world collaborator the history engine reads from and writes to.
///
/// Implementations must tolerate single-cell reads and writes from many
/// threads. No cross-cell atomicity is expected.
pub trait BlockWorld: Send + Sync {
    /// Current value of a cell.
    fn get_block(&self, pos: CellPos) -> BlockId;

    /// Overwrite a cell. Fire-and-forget: client notification is the
    /// implementation's concern.
    fn block_change(&self, pos: CellPos, block: BlockId);
}
