//! Undo and redo over a player's history in one world.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use blocklog_core::types::{BlockId, CellMap, CellPos, PlayerId, Tick};
use blocklog_persist::RedoRecord;
use blocklog_world::BlockWorld;

use crate::error::HistoryError;
use crate::reconcile;
use crate::registry::HistoryRegistry;

/// What an undo did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// Cells whose value was changed.
    pub reverted: usize,
    /// Window cells whose target came from another player's later edit.
    pub reconciled: usize,
    /// Redo trail written for this undo, if any cell changed.
    pub trail: Option<PathBuf>,
}

/// What a redo did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RedoOutcome {
    /// Cells whose value was changed.
    pub reapplied: usize,
    pub trails_read: usize,
}

/// Undo/redo entry point. Stateless apart from the registry it reads.
pub struct HistoryEngine {
    registry: Arc<HistoryRegistry>,
}

impl HistoryEngine {
    pub fn new(registry: Arc<HistoryRegistry>) -> Self {
        Self { registry }
    }

    /// Revert every edit `player` made in `world` at or after `since`.
    ///
    /// A cell another player changed after the undone edit keeps that
    /// player's value. The values being overwritten are persisted as a
    /// redo trail before any cell is touched. On error the world is
    /// unchanged and the player's edits are back in their history, so the
    /// undo can be re-issued.
    pub fn undo(
        &self,
        player: PlayerId,
        world: &str,
        since: Tick,
        world_access: &dyn BlockWorld,
    ) -> Result<UndoOutcome, HistoryError> {
        let history = self.registry.history(player);
        let taken = history.original_blocks(world, since)?;
        if taken.cells.is_empty() {
            log::debug!("undo by {player} in {world} since {since}: nothing to revert");
            return Ok(UndoOutcome::default());
        }

        match self.revert(player, world, since, taken.cells, world_access) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::warn!("undo by {player} in {world} since {since} failed: {e}");
                history.restore(world, taken.records);
                Err(e)
            }
        }
    }

    fn revert(
        &self,
        player: PlayerId,
        world: &str,
        since: Tick,
        mut window: CellMap,
        world_access: &dyn BlockWorld,
    ) -> Result<UndoOutcome, HistoryError> {
        // Buffers before the archive: an edit flushed in between is then
        // seen in at least one of the two.
        let mut reconciled = HashSet::new();
        for other in self.registry.histories() {
            if other.id() == player {
                continue;
            }
            let snapshot = other.reconciliation_snapshot(world, since);
            reconciled.extend(reconcile::reconcile_window(&mut window, &snapshot));
        }
        let archived = self
            .registry
            .store()
            .scan_for_reconciliation(world, since, player)?;
        reconciled.extend(reconcile::reconcile_window(&mut window, &archived));

        let (plan, trail) = plan_changes(&window, world_access);
        let trail_path = self.registry.store().append_redo_trail(
            world,
            player,
            self.registry.clock().now(),
            &trail,
        )?;
        for &(pos, block) in &plan {
            world_access.block_change(pos, block);
        }

        log::info!(
            "undo by {player} in {world} since {since}: {} cells reverted, {} kept from other players",
            plan.len(),
            reconciled.len()
        );
        Ok(UndoOutcome {
            reverted: plan.len(),
            reconciled: reconciled.len(),
            trail: trail_path,
        })
    }

    /// Re-apply what undos by `player` in `world` overwrote, using every
    /// redo trail created at or after `since`. Later trails win per cell.
    ///
    /// Reapplied changes are recorded as fresh edits, so they can be undone
    /// again.
    pub fn redo(
        &self,
        player: PlayerId,
        world: &str,
        since: Tick,
        world_access: &dyn BlockWorld,
    ) -> Result<RedoOutcome, HistoryError> {
        let history = self.registry.history(player);
        let trails = self
            .registry
            .store()
            .read_redo_trails(world, player, since)?;

        let mut targets = CellMap::new();
        for trail in &trails {
            for entry in &trail.entries {
                reconcile::merge_newer(&mut targets, entry.pos, trail.created, entry.block);
            }
        }

        let mut cells: Vec<(CellPos, BlockId)> =
            targets.iter().map(|(pos, v)| (*pos, v.block)).collect();
        cells.sort_by_key(|(pos, _)| (pos.x, pos.y, pos.z));

        let mut reapplied = 0;
        for (pos, block) in cells {
            let current = world_access.get_block(pos);
            if current == block {
                continue;
            }
            history.add(world, pos, current, block);
            world_access.block_change(pos, block);
            reapplied += 1;
        }

        log::info!(
            "redo by {player} in {world} since {since}: {reapplied} cells from {} trails",
            trails.len()
        );
        Ok(RedoOutcome {
            reapplied,
            trails_read: trails.len(),
        })
    }
}

/// Changes needed to bring the world to `window`, and the redo entries
/// holding what those changes overwrite. Cells already at their target are
/// skipped. Ordered by position so application is deterministic.
fn plan_changes(
    window: &CellMap,
    world_access: &dyn BlockWorld,
) -> (Vec<(CellPos, BlockId)>, Vec<RedoRecord>) {
    let mut cells: Vec<(CellPos, BlockId)> =
        window.iter().map(|(pos, v)| (*pos, v.block)).collect();
    cells.sort_by_key(|(pos, _)| (pos.x, pos.y, pos.z));

    let mut plan = Vec::new();
    let mut trail = Vec::new();
    for (pos, target) in cells {
        let current = world_access.get_block(pos);
        if current != target {
            plan.push((pos, target));
            trail.push(RedoRecord {
                pos,
                block: current,
            });
        }
    }
    (plan, trail)
}
