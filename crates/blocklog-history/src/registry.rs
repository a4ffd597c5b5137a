use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use blocklog_core::clock::Clock;
use blocklog_core::types::PlayerId;
use blocklog_persist::ArchiveStore;
use parking_lot::RwLock;

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::player::PlayerHistory;

/// Session view of history: every known player's history and which worlds
/// each player is currently in.
///
/// The registry's maps are only held long enough to clone `Arc`s out; no
/// player lock is ever taken while they are held.
pub struct HistoryRegistry {
    store: Arc<ArchiveStore>,
    clock: Arc<dyn Clock>,
    flush_threshold: usize,
    players: RwLock<HashMap<PlayerId, Arc<PlayerHistory>>>,
    presence: RwLock<HashMap<String, BTreeSet<PlayerId>>>,
}

impl HistoryRegistry {
    pub fn new(store: Arc<ArchiveStore>, clock: Arc<dyn Clock>, flush_threshold: usize) -> Self {
        Self {
            store,
            clock,
            flush_threshold,
            players: RwLock::new(HashMap::new()),
            presence: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.open_store(), clock, config.flush_threshold)
    }

    pub fn store(&self) -> &Arc<ArchiveStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// History of `player`, created on first request.
    pub fn history(&self, player: PlayerId) -> Arc<PlayerHistory> {
        if let Some(history) = self.players.read().get(&player) {
            return Arc::clone(history);
        }
        let mut players = self.players.write();
        Arc::clone(players.entry(player).or_insert_with(|| {
            log::debug!("creating history for player {player}");
            Arc::new(PlayerHistory::new(
                player,
                Arc::clone(&self.store),
                Arc::clone(&self.clock),
                self.flush_threshold,
            ))
        }))
    }

    /// Mark `player` present in `world`.
    pub fn join_world(&self, player: PlayerId, world: &str) -> Arc<PlayerHistory> {
        self.presence
            .write()
            .entry(world.to_string())
            .or_default()
            .insert(player);
        self.history(player)
    }

    /// Archive `player`'s buffered edits in `world`, then mark them absent.
    /// On a flush failure the player stays present.
    pub fn leave_world(&self, player: PlayerId, world: &str) -> Result<(), HistoryError> {
        self.history(player).flush_world(world)?;
        let mut presence = self.presence.write();
        if let Some(present) = presence.get_mut(world) {
            present.remove(&player);
            if present.is_empty() {
                presence.remove(world);
            }
        }
        Ok(())
    }

    /// Move `player` between worlds, flushing what they did in the old one.
    pub fn change_world(
        &self,
        player: PlayerId,
        from: &str,
        to: &str,
    ) -> Result<Arc<PlayerHistory>, HistoryError> {
        self.leave_world(player, from)?;
        Ok(self.join_world(player, to))
    }

    /// Drop `player` from the session after archiving everything they
    /// buffered. On a flush failure the player stays registered and present.
    pub fn disconnect(&self, player: PlayerId) -> Result<(), HistoryError> {
        let history = self.players.read().get(&player).cloned();
        if let Some(history) = history {
            history.flush_all()?;
        }
        self.presence.write().retain(|_, present| {
            present.remove(&player);
            !present.is_empty()
        });
        if self.players.write().remove(&player).is_some() {
            log::debug!("player {player} disconnected");
        }
        Ok(())
    }

    /// Histories of every player currently in `world`.
    pub fn present_in(&self, world: &str) -> Vec<Arc<PlayerHistory>> {
        let ids: Vec<PlayerId> = self
            .presence
            .read()
            .get(world)
            .map(|present| present.iter().copied().collect())
            .unwrap_or_default();
        ids.into_iter().map(|id| self.history(id)).collect()
    }

    pub fn is_present(&self, player: PlayerId, world: &str) -> bool {
        self.presence
            .read()
            .get(world)
            .is_some_and(|present| present.contains(&player))
    }

    /// Every registered history, present in a world or not.
    pub fn histories(&self) -> Vec<Arc<PlayerHistory>> {
        self.players.read().values().cloned().collect()
    }

    /// Archive every buffered edit of every player. Each player is attempted;
    /// the first failure is returned.
    pub fn flush_all(&self) -> Result<(), HistoryError> {
        let mut first_error = None;
        for history in self.histories() {
            if let Err(e) = history.flush_all() {
                log::warn!("periodic flush of player {} failed: {e}", history.id());
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Archive only buffers that reached the flush threshold.
    pub fn flush_oversized(&self) -> Result<(), HistoryError> {
        let mut first_error = None;
        for history in self.histories() {
            if !history.needs_flush() {
                continue;
            }
            if let Err(e) = history.flush_oversized() {
                log::warn!("threshold flush of player {} failed: {e}", history.id());
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Rename a world's history. Buffered edits for the old name are
    /// archived first so nothing is left behind under it.
    pub fn rename_world(&self, old: &str, new: &str) -> Result<bool, HistoryError> {
        for history in self.histories() {
            history.flush_world(old)?;
        }
        let moved = self.store.rename_world(old, new)?;
        let mut presence = self.presence.write();
        if let Some(present) = presence.remove(old) {
            presence.entry(new.to_string()).or_default().extend(present);
        }
        Ok(moved)
    }
}
