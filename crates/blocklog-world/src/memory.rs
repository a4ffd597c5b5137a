use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use blocklog_core::types::{BlockId, CellPos};
use parking_lot::RwLock;

use crate::BlockWorld;

/// Sparse in-memory world: every cell not stored holds the fill value.
pub struct MemoryWorld {
    cells: RwLock<HashMap<CellPos, BlockId>>,
    fill: BlockId,
    /// Number of `block_change` calls, for callers checking mutation counts.
    changes: AtomicU64,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    /// Create an all-air world.
    pub fn new() -> Self {
        Self::with_fill(BlockId::default())
    }

    pub fn with_fill(fill: BlockId) -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
            fill,
            changes: AtomicU64::new(0),
        }
    }

    /// Set a cell without counting it as a change (world setup).
    pub fn set(&self, pos: CellPos, block: BlockId) {
        let mut cells = self.cells.write();
        if block == self.fill {
            cells.remove(&pos);
        } else {
            cells.insert(pos, block);
        }
    }

    /// Number of cells holding something other than the fill value.
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    /// Total `block_change` calls so far.
    pub fn change_count(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }
}

impl BlockWorld for MemoryWorld {
    fn get_block(&self, pos: CellPos) -> BlockId {
        self.cells.read().get(&pos).copied().unwrap_or(self.fill)
    }

    fn block_change(&self, pos: CellPos, block: BlockId) {
        log::trace!("block change at {pos} -> {}", block.0);
        self.set(pos, block);
        self.changes.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cells_read_fill() {
        let world = MemoryWorld::with_fill(BlockId(7));
        assert_eq!(world.get_block(CellPos::new(1, 2, 3)), BlockId(7));
        assert!(world.is_empty());
    }

    #[test]
    fn test_block_change_counts() {
        let world = MemoryWorld::new();
        let pos = CellPos::new(0, 5, 0);
        world.set(pos, BlockId(1));
        assert_eq!(world.change_count(), 0);

        world.block_change(pos, BlockId(2));
        assert_eq!(world.get_block(pos), BlockId(2));
        assert_eq!(world.change_count(), 1);
    }

    #[test]
    fn test_writing_fill_clears_cell() {
        let world = MemoryWorld::new();
        let pos = CellPos::new(-4, 0, 9);
        world.block_change(pos, BlockId(3));
        assert_eq!(world.len(), 1);
        world.block_change(pos, BlockId(0));
        assert_eq!(world.len(), 0);
        assert_eq!(world.get_block(pos), BlockId(0));
    }
}
