//! Shared constants for the history log.

/// Clock ticks per second (100 ns ticks).
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Recent-buffer length at which a player's buffer is due for a flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 4096;
