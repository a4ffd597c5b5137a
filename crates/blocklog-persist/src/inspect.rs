use std::collections::HashSet;
use std::path::PathBuf;

use blocklog_core::types::{PlayerId, Tick};
use serde::Serialize;

use crate::archive::ArchiveStore;
use crate::error::PersistError;

/// Read-only description of one history segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentSummary {
    pub player: PlayerId,
    pub path: PathBuf,
    /// Tick from the file name.
    pub key: Tick,
    pub first: Option<Tick>,
    pub last: Option<Tick>,
    pub records: usize,
    pub distinct_cells: usize,
}

/// Summarize the segments of one player, or of every player when `player`
/// is None. Nothing is consumed.
pub fn summarize_segments(
    store: &ArchiveStore,
    world: &str,
    player: Option<PlayerId>,
) -> Result<Vec<SegmentSummary>, PersistError> {
    let players = match player {
        Some(p) => vec![p],
        None => store.players(world)?,
    };

    let mut summaries = Vec::new();
    for player in players {
        for (key, path) in store.segments(world, player)? {
            let records = store.read_segment(&path)?;
            let distinct_cells = records.iter().map(|r| r.pos).collect::<HashSet<_>>().len();
            summaries.push(SegmentSummary {
                player,
                key,
                first: records.first().map(|r| r.time),
                last: records.last().map(|r| r.time),
                records: records.len(),
                distinct_cells,
                path,
            });
        }
    }
    Ok(summaries)
}
