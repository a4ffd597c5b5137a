use blocklog_core::types::{BlockId, CellPos};
use blocklog_world::BlockWorld;

use crate::player::PlayerHistory;

/// Set `pos` to `block` on behalf of a player and log the edit.
///
/// Returns false without touching the world or the history when the cell
/// already holds `block`.
pub fn record_change(
    world_access: &dyn BlockWorld,
    history: &PlayerHistory,
    world: &str,
    pos: CellPos,
    block: BlockId,
) -> bool {
    let current = world_access.get_block(pos);
    if current == block {
        return false;
    }
    world_access.block_change(pos, block);
    history.add(world, pos, current, block);
    true
}
