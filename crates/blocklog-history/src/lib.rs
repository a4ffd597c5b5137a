pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod player;
pub mod recent;
pub mod reconcile;
pub mod registry;
#[cfg(test)]
mod test_harness;

pub use config::{load_config, load_config_from_str, ConfigError, HistoryConfig};
pub use edit::record_change;
pub use engine::{HistoryEngine, RedoOutcome, UndoOutcome};
pub use error::HistoryError;
pub use player::PlayerHistory;
pub use recent::RecentBuffer;
pub use registry::HistoryRegistry;
