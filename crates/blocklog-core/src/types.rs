use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One addressable cell of the world grid.
///
/// Coordinates are bounded 16-bit signed integers. On disk the components
/// are written in x, z, y order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl CellPos {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Newtype for a cell's content type. 0 = air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockId(pub u8);

/// Clock reading in 100 ns ticks.
///
/// Orders edits from the same source; only loosely comparable across sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable player identifier, also the name of the player's archive directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A block value together with the tick of the edit it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versioned {
    pub time: Tick,
    pub block: BlockId,
}

impl Versioned {
    pub fn new(time: Tick, block: BlockId) -> Self {
        Self { time, block }
    }
}

/// A single edit as seen by reconciliation: where, when, and the value written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    pub pos: CellPos,
    pub time: Tick,
    pub block: BlockId,
}

/// Per-cell accumulator used while computing undo and redo targets.
pub type CellMap = HashMap<CellPos, Versioned>;
