use std::collections::HashMap;
use std::sync::Arc;

use blocklog_core::clock::Clock;
use blocklog_core::types::{BlockId, CellEdit, CellPos, PlayerId, Tick};
use blocklog_persist::{ArchiveStore, ConsumedEdits, HistoryRecord};
use parking_lot::Mutex;

use crate::error::HistoryError;
use crate::recent::RecentBuffer;
use crate::reconcile;

/// Edit history of one player: a recent buffer per world, backed by the
/// shared archive store.
///
/// The buffers sit behind this player's own lock. Whenever both are needed
/// that lock is taken before the archive store's.
pub struct PlayerHistory {
    id: PlayerId,
    store: Arc<ArchiveStore>,
    clock: Arc<dyn Clock>,
    flush_threshold: usize,
    recent: Mutex<HashMap<String, RecentBuffer>>,
}

impl PlayerHistory {
    pub fn new(
        id: PlayerId,
        store: Arc<ArchiveStore>,
        clock: Arc<dyn Clock>,
        flush_threshold: usize,
    ) -> Self {
        Self {
            id,
            store,
            clock,
            flush_threshold,
            recent: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Record an edit at the current tick. The world's buffer is created on
    /// first use.
    pub fn add(&self, world: &str, pos: CellPos, old: BlockId, new: BlockId) {
        let time = self.clock.now();
        let mut recent = self.recent.lock();
        recent
            .entry(world.to_string())
            .or_default()
            .add(time, pos, old, new);
    }

    /// Number of edits buffered for `world`.
    pub fn buffered(&self, world: &str) -> usize {
        self.recent.lock().get(world).map_or(0, RecentBuffer::len)
    }

    /// Whether any world's buffer has reached the flush threshold.
    pub fn needs_flush(&self) -> bool {
        self.recent
            .lock()
            .values()
            .any(|buf| buf.len() >= self.flush_threshold)
    }

    /// Archive everything buffered for `world`. On failure the records go
    /// back into the buffer.
    pub fn flush_world(&self, world: &str) -> Result<(), HistoryError> {
        let mut recent = self.recent.lock();
        let Some(buffer) = recent.get_mut(world) else {
            return Ok(());
        };
        let records = buffer.flush();
        if let Err(e) = self.store.append(world, self.id, &records) {
            log::warn!("flush of player {} in {world} failed: {e}", self.id);
            buffer.restore(records);
            return Err(e.into());
        }
        recent.remove(world);
        Ok(())
    }

    /// Archive every world's buffer. Stops at the first failure.
    pub fn flush_all(&self) -> Result<(), HistoryError> {
        let worlds: Vec<String> = self.recent.lock().keys().cloned().collect();
        for world in worlds {
            self.flush_world(&world)?;
        }
        Ok(())
    }

    /// Flush only the worlds whose buffers reached the threshold.
    pub fn flush_oversized(&self) -> Result<(), HistoryError> {
        let worlds: Vec<String> = self
            .recent
            .lock()
            .iter()
            .filter(|(_, buf)| buf.len() >= self.flush_threshold)
            .map(|(world, _)| world.clone())
            .collect();
        for world in worlds {
            self.flush_world(&world)?;
        }
        Ok(())
    }

    /// Consume this player's edits in `world` at or after `since`, returning
    /// per cell the value it held before its earliest such edit.
    ///
    /// The archive is only consulted when the window reaches past the
    /// buffer: the buffer is empty or starts at or after `since`. If the
    /// archive cannot be read, the buffered edits are put back.
    pub fn original_blocks(
        &self,
        world: &str,
        since: Tick,
    ) -> Result<ConsumedEdits, HistoryError> {
        let mut recent = self.recent.lock();
        let buffer = recent.entry(world.to_string()).or_default();
        let reaches_archive = buffer.oldest().map_or(true, |oldest| oldest >= since);
        let mut result = buffer.extract_since(since);

        if reaches_archive {
            match self.store.scan_original_blocks(world, self.id, since) {
                Ok(archived) => reconcile::absorb_older(&mut result, archived),
                Err(e) => {
                    buffer.restore(result.records);
                    return Err(e.into());
                }
            }
        }
        Ok(result)
    }

    /// Give back edits taken by `original_blocks` when the undo using them
    /// did not go through. They return to the buffer and are archived by
    /// the next flush.
    pub fn restore(&self, world: &str, records: Vec<HistoryRecord>) {
        if records.is_empty() {
            return;
        }
        log::debug!(
            "restoring {} edits of player {} in {world}",
            records.len(),
            self.id
        );
        self.recent
            .lock()
            .entry(world.to_string())
            .or_default()
            .restore(records);
    }

    /// Read-only view of this player's buffered edits at or after `since`.
    /// This is what other players' undos reconcile against.
    pub fn reconciliation_snapshot(&self, world: &str, since: Tick) -> Vec<CellEdit> {
        self.recent
            .lock()
            .get(world)
            .map(|buffer| buffer.scan_forward(since))
            .unwrap_or_default()
    }
}
