use blocklog_core::types::{BlockId, CellEdit, CellMap, CellPos, Tick, Versioned};
use blocklog_persist::{ConsumedEdits, HistoryRecord};

/// Ordered in-memory log of one player's not-yet-archived edits in one world.
///
/// Ticks are non-decreasing in insertion order; a tick older than the last
/// entry is clamped up to it.
#[derive(Debug, Default, Clone)]
pub struct RecentBuffer {
    edits: Vec<HistoryRecord>,
}

impl RecentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edit. Never touches disk.
    pub fn add(&mut self, time: Tick, pos: CellPos, old: BlockId, new: BlockId) {
        let time = match self.edits.last() {
            Some(last) if last.time > time => {
                log::debug!("clock went backwards ({time} < {}), clamping", last.time);
                last.time
            }
            _ => time,
        };
        self.edits.push(HistoryRecord {
            time,
            pos,
            old,
            new,
        });
    }

    /// Remove every edit at or after `since`. The result holds, per
    /// position, the tick and old value of the earliest removed edit (the
    /// value the cell held just before the window) plus the removed records.
    pub fn extract_since(&mut self, since: Tick) -> ConsumedEdits {
        let start = self.edits.partition_point(|e| e.time < since);
        let records: Vec<HistoryRecord> = self.edits.drain(start..).collect();
        let mut cells = CellMap::new();
        // Newest first, so the edit nearest the boundary is assigned last.
        for edit in records.iter().rev() {
            cells.insert(edit.pos, Versioned::new(edit.time, edit.old));
        }
        ConsumedEdits { cells, records }
    }

    /// Edits at or after `since`, oldest first, with their new values.
    pub fn scan_forward(&self, since: Tick) -> Vec<CellEdit> {
        let start = self.edits.partition_point(|e| e.time < since);
        self.edits[start..]
            .iter()
            .map(|e| CellEdit {
                pos: e.pos,
                time: e.time,
                block: e.new,
            })
            .collect()
    }

    /// Take every buffered edit in insertion order, leaving the buffer empty.
    pub fn flush(&mut self) -> Vec<HistoryRecord> {
        std::mem::take(&mut self.edits)
    }

    /// Put back records taken by `flush` or `extract_since`: after edits
    /// older than them, in front of anything added since.
    pub fn restore(&mut self, records: Vec<HistoryRecord>) {
        let Some(first) = records.first() else {
            return;
        };
        let at = self.edits.partition_point(|e| e.time < first.time);
        self.edits.splice(at..at, records);
    }

    /// Tick of the oldest buffered edit.
    pub fn oldest(&self) -> Option<Tick> {
        self.edits.first().map(|e| e.time)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
