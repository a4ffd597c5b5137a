//! Shared fixture for history tests: a temp-dir archive, a manual clock and
//! an in-memory world.

use std::sync::Arc;

use blocklog_core::clock::ManualClock;
use blocklog_core::constants::DEFAULT_FLUSH_THRESHOLD;
use blocklog_core::types::PlayerId;
use blocklog_persist::{ArchiveStore, Compression, RecordCodec};
use blocklog_world::MemoryWorld;
use tempfile::TempDir;

use crate::engine::HistoryEngine;
use crate::player::PlayerHistory;
use crate::registry::HistoryRegistry;

pub struct Harness {
    _dir: TempDir,
    pub store: Arc<ArchiveStore>,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<HistoryRegistry>,
    pub world: MemoryWorld,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_threshold(flush_threshold: usize) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(ArchiveStore::new(
            dir.path(),
            RecordCodec::default(),
            Compression::Gzip,
        ));
        let clock = Arc::new(ManualClock::new(1));
        let registry = Arc::new(HistoryRegistry::new(
            Arc::clone(&store),
            clock.clone(),
            flush_threshold,
        ));
        Self {
            _dir: dir,
            store,
            clock,
            registry,
            world: MemoryWorld::new(),
        }
    }

    pub fn player(&self, id: u64) -> Arc<PlayerHistory> {
        self.registry.history(PlayerId(id))
    }

    pub fn engine(&self) -> HistoryEngine {
        HistoryEngine::new(Arc::clone(&self.registry))
    }
}
