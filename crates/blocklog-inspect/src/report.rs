use std::path::PathBuf;

use blocklog_core::types::{PlayerId, Tick};
use blocklog_persist::{HistoryRecord, RedoTrail, SegmentSummary};
use serde::Serialize;

/// One redo-trail file as listed by `trails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailSummary {
    pub player: PlayerId,
    pub path: PathBuf,
    pub created: Tick,
    pub entries: usize,
}

impl TrailSummary {
    pub fn new(player: PlayerId, trail: &RedoTrail) -> Self {
        Self {
            player,
            path: trail.path.clone(),
            created: trail.created,
            entries: trail.entries.len(),
        }
    }
}

fn tick_or_dash(tick: Option<Tick>) -> String {
    tick.map_or_else(|| "-".to_string(), |t| t.to_string())
}

/// Format segment summaries as a markdown table.
pub fn format_segments(summaries: &[SegmentSummary]) -> String {
    let mut out = String::new();
    out.push_str("| Player | File | First | Last | Records | Cells |\n");
    out.push_str("|--------|------|-------|------|---------|-------|\n");

    for s in summaries {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            s.player,
            s.path.display(),
            tick_or_dash(s.first),
            tick_or_dash(s.last),
            s.records,
            s.distinct_cells,
        ));
    }
    out
}

/// Format every record of one segment as a markdown table.
pub fn format_records(records: &[HistoryRecord]) -> String {
    let mut out = String::new();
    out.push_str("| Tick | Cell | Old | New |\n");
    out.push_str("|------|------|-----|-----|\n");

    for r in records {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            r.time, r.pos, r.old.0, r.new.0
        ));
    }
    out
}

/// Format redo-trail summaries as a markdown table.
pub fn format_trails(trails: &[TrailSummary]) -> String {
    let mut out = String::new();
    out.push_str("| Player | File | Created | Entries |\n");
    out.push_str("|--------|------|---------|---------|\n");

    for t in trails {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            t.player,
            t.path.display(),
            t.created,
            t.entries,
        ));
    }
    out
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklog_core::types::{BlockId, CellPos};

    #[test]
    fn test_segment_table_rows() {
        let summaries = vec![SegmentSummary {
            player: PlayerId(7),
            path: PathBuf::from("h/main/7/100.bch"),
            key: Tick(100),
            first: Some(Tick(100)),
            last: Some(Tick(250)),
            records: 3,
            distinct_cells: 2,
        }];
        let table = format_segments(&summaries);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "| 7 | h/main/7/100.bch | 100 | 250 | 3 | 2 |");
    }

    #[test]
    fn test_empty_segment_shows_dashes() {
        let summaries = vec![SegmentSummary {
            player: PlayerId(1),
            path: PathBuf::from("1.bch"),
            key: Tick(1),
            first: None,
            last: None,
            records: 0,
            distinct_cells: 0,
        }];
        assert!(format_segments(&summaries).contains("| - | - | 0 | 0 |"));
    }

    #[test]
    fn test_record_table() {
        let records = [HistoryRecord {
            time: Tick(42),
            pos: CellPos::new(1, -2, 3),
            old: BlockId(0),
            new: BlockId(9),
        }];
        let table = format_records(&records);
        assert!(table.ends_with("| 42 | (1, -2, 3) | 0 | 9 |\n"));
    }

    #[test]
    fn test_trail_json_shape() {
        let trails = vec![TrailSummary {
            player: PlayerId(3),
            path: PathBuf::from("300.bcf"),
            created: Tick(300),
            entries: 4,
        }];
        let json = to_json(&trails).expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["created"], 300);
        assert_eq!(value[0]["entries"], 4);
        assert_eq!(value[0]["player"], 3);
    }
}
