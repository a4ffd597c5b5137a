//! Cross-source merge rules. Pure; no I/O.

use std::collections::HashSet;

use blocklog_core::types::{BlockId, CellEdit, CellMap, CellPos, Tick, Versioned};
use blocklog_persist::ConsumedEdits;

/// Keep the newer of the stored value and the candidate.
///
/// An edit made after the point being reverted to must win over the
/// reverted value, so undoing one player never erases a later edit by
/// another player to the same cell.
pub fn merge_newer(result: &mut CellMap, pos: CellPos, time: Tick, block: BlockId) {
    match result.get(&pos) {
        Some(existing) if existing.time >= time => {}
        _ => {
            result.insert(pos, Versioned::new(time, block));
        }
    }
}

/// Merge other sources' edits into an undo window. Only cells already in
/// the window are considered; cells the undoing player never touched are
/// not rewritten. Returns the positions whose target changed.
pub fn reconcile_window(result: &mut CellMap, candidates: &[CellEdit]) -> HashSet<CellPos> {
    let mut overridden = HashSet::new();
    for edit in candidates {
        let Some(current) = result.get(&edit.pos) else {
            continue;
        };
        if current.time < edit.time {
            merge_newer(result, edit.pos, edit.time, edit.block);
            overridden.insert(edit.pos);
        }
    }
    overridden
}

/// Fold an older scan into a newer one: the older value wins per position
/// and the older records go in front.
///
/// Used when the undo window reaches past the in-memory buffer into the
/// archive, whose edits all precede the buffer's.
pub fn absorb_older(result: &mut ConsumedEdits, mut older: ConsumedEdits) {
    result.cells.extend(older.cells);
    older.records.append(&mut result.records);
    result.records = older.records;
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklog_persist::HistoryRecord;

    const P: CellPos = CellPos::new(1, 1, 1);
    const Q: CellPos = CellPos::new(3, 0, 3);

    fn edit(pos: CellPos, time: u64, block: u8) -> CellEdit {
        CellEdit {
            pos,
            time: Tick(time),
            block: BlockId(block),
        }
    }

    #[test]
    fn test_merge_newer_inserts_missing() {
        let mut map = CellMap::new();
        merge_newer(&mut map, P, Tick(5), BlockId(1));
        assert_eq!(map[&P], Versioned::new(Tick(5), BlockId(1)));
    }

    #[test]
    fn test_merge_newer_requires_strictly_newer() {
        let mut map = CellMap::new();
        merge_newer(&mut map, P, Tick(5), BlockId(1));
        merge_newer(&mut map, P, Tick(5), BlockId(2));
        assert_eq!(map[&P].block, BlockId(1));
        merge_newer(&mut map, P, Tick(4), BlockId(3));
        assert_eq!(map[&P].block, BlockId(1));
        merge_newer(&mut map, P, Tick(6), BlockId(4));
        assert_eq!(map[&P], Versioned::new(Tick(6), BlockId(4)));
    }

    #[test]
    fn test_reconcile_window_ignores_untouched_cells() {
        let mut map = CellMap::new();
        map.insert(P, Versioned::new(Tick(100), BlockId(0)));

        let overridden = reconcile_window(&mut map, &[edit(Q, 200, 9), edit(P, 150, 2)]);
        assert_eq!(overridden, HashSet::from([P]));
        assert!(!map.contains_key(&Q));
        assert_eq!(map[&P], Versioned::new(Tick(150), BlockId(2)));
    }

    #[test]
    fn test_reconcile_window_latest_candidate_wins() {
        let mut map = CellMap::new();
        map.insert(P, Versioned::new(Tick(100), BlockId(0)));
        reconcile_window(&mut map, &[edit(P, 300, 3), edit(P, 200, 2)]);
        assert_eq!(map[&P], Versioned::new(Tick(300), BlockId(3)));
    }

    #[test]
    fn test_reconcile_window_counts_each_cell_once() {
        let mut map = CellMap::new();
        map.insert(P, Versioned::new(Tick(100), BlockId(0)));
        map.insert(Q, Versioned::new(Tick(100), BlockId(0)));
        let overridden = reconcile_window(
            &mut map,
            &[edit(P, 200, 2), edit(P, 300, 3), edit(P, 400, 4), edit(Q, 150, 1)],
        );
        assert_eq!(overridden.len(), 2);
        assert_eq!(map[&P].block, BlockId(4));
    }

    #[test]
    fn test_reconcile_window_keeps_older_candidates_out() {
        let mut map = CellMap::new();
        map.insert(P, Versioned::new(Tick(100), BlockId(0)));
        reconcile_window(&mut map, &[edit(P, 50, 7)]);
        assert_eq!(map[&P].block, BlockId(0));
    }

    #[test]
    fn test_absorb_older_overrides() {
        let record = |time: u64, pos: CellPos, old: u8| HistoryRecord {
            time: Tick(time),
            pos,
            old: BlockId(old),
            new: BlockId(old + 1),
        };
        let mut newer = ConsumedEdits::default();
        newer.cells.insert(P, Versioned::new(Tick(200), BlockId(5)));
        newer.cells.insert(Q, Versioned::new(Tick(210), BlockId(6)));
        newer.records = vec![record(200, P, 5), record(210, Q, 6)];
        let mut older = ConsumedEdits::default();
        older.cells.insert(P, Versioned::new(Tick(100), BlockId(1)));
        older.records = vec![record(100, P, 1)];

        absorb_older(&mut newer, older);
        assert_eq!(newer.cells[&P], Versioned::new(Tick(100), BlockId(1)));
        assert_eq!(newer.cells[&Q].block, BlockId(6));
        let times: Vec<u64> = newer.records.iter().map(|r| r.time.0).collect();
        assert_eq!(times, vec![100, 200, 210]);
    }
}
