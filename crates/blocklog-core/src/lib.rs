pub mod clock;
pub mod constants;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{BlockId, CellEdit, CellMap, CellPos, PlayerId, Tick, Versioned};
