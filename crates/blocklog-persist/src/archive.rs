//! On-disk archive of flushed edits and redo trails.
//!
//! Every file operation runs under one store-wide lock. Callers that also
//! hold a per-player lock must take it first; the store never calls back
//! out while holding its own lock.

use std::fs;
use std::path::{Path, PathBuf};

use blocklog_core::types::{CellEdit, CellMap, PlayerId, Tick, Versioned};
use parking_lot::Mutex;

use crate::codec::RecordCodec;
use crate::compress;
use crate::error::PersistError;
use crate::format::*;
use crate::layout;

/// One redo-trail file, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedoTrail {
    /// Creation tick (file name); the recency of every entry in the file.
    pub created: Tick,
    pub path: PathBuf,
    pub entries: Vec<RedoRecord>,
}

/// Segments split around an undo boundary.
#[derive(Debug, Default)]
struct Classified {
    /// Segments whose first record is at or after the boundary, newest first.
    complete: Vec<(Tick, PathBuf)>,
    /// The newest segment starting before the boundary; may straddle it.
    partial: Option<(Tick, PathBuf)>,
}

/// `files` must be sorted oldest first. Segments older than the partial one
/// are irrelevant and dropped.
fn classify(mut files: Vec<(Tick, PathBuf)>, since: Tick) -> Classified {
    let split = files.partition_point(|(tick, _)| *tick < since);
    let mut complete = files.split_off(split);
    complete.reverse();
    Classified {
        complete,
        partial: files.pop(),
    }
}

/// Store of compressed history segments and redo trails for every player
/// and world under one base directory.
pub struct ArchiveStore {
    base: PathBuf,
    codec: RecordCodec,
    compression: Compression,
    lock: Mutex<()>,
}

impl ArchiveStore {
    pub fn new(base: impl Into<PathBuf>, codec: RecordCodec, compression: Compression) -> Self {
        Self {
            base: base.into(),
            codec,
            compression,
            lock: Mutex::new(()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn codec(&self) -> RecordCodec {
        self.codec
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Write `records` (oldest first) as a new segment named by the first
    /// record's tick. Returns the segment path, or None for empty input.
    ///
    /// A segment that already carries that name is merged with the new
    /// records in tick order.
    pub fn append(
        &self,
        world: &str,
        player: PlayerId,
        records: &[HistoryRecord],
    ) -> Result<Option<PathBuf>, PersistError> {
        layout::validate_world_name(world)?;
        let Some(first) = records.first() else {
            return Ok(None);
        };

        let _guard = self.lock.lock();
        let dir = layout::player_dir(&self.base, world, player);
        fs::create_dir_all(&dir).map_err(|e| PersistError::io(&dir, e))?;
        let path = layout::file_path(&dir, first.time, HISTORY_EXTENSION);

        if path.exists() {
            let mut merged = self.read_history(&path)?;
            merged.extend_from_slice(records);
            merged.sort_by_key(|r| r.time);
            log::debug!(
                "merging {} records into existing segment {}",
                records.len(),
                path.display()
            );
            self.write_file(&path, &self.codec.encode_history(&merged))?;
        } else {
            self.write_file(&path, &self.codec.encode_history(records))?;
        }

        log::debug!(
            "archived {} edits for player {player} in {world}",
            records.len()
        );
        Ok(Some(path))
    }

    /// Collect and consume this player's archived edits at or after `since`.
    ///
    /// Per position the result holds `(time, old)` of the earliest such edit,
    /// along with every consumed record. Complete segments are deleted; the
    /// straddling segment is rewritten with only its records before `since`.
    /// Nothing is removed unless every involved segment decoded cleanly.
    pub fn scan_original_blocks(
        &self,
        world: &str,
        player: PlayerId,
        since: Tick,
    ) -> Result<ConsumedEdits, PersistError> {
        layout::validate_world_name(world)?;
        let _guard = self.lock.lock();
        let dir = layout::player_dir(&self.base, world, player);
        let classified = classify(layout::list_files(&dir, HISTORY_EXTENSION)?, since);

        let mut complete = Vec::with_capacity(classified.complete.len());
        for (_, path) in classified.complete {
            let records = self.read_history(&path)?;
            complete.push((path, records));
        }
        let partial = match classified.partial {
            Some((_, path)) => {
                let records = self.read_history(&path)?;
                let keep = records.partition_point(|r| r.time < since);
                Some((path, records, keep))
            }
            None => None,
        };

        // Oldest first: the straddling tail, then complete segments in name order.
        let mut consumed = Vec::new();
        if let Some((_, records, keep)) = &partial {
            consumed.extend_from_slice(&records[*keep..]);
        }
        for (_, records) in complete.iter().rev() {
            consumed.extend_from_slice(records);
        }

        // Newest record first: the oldest edit per position is assigned last
        // and survives.
        let mut cells = CellMap::new();
        for record in consumed.iter().rev() {
            cells.insert(record.pos, Versioned::new(record.time, record.old));
        }

        for (path, _) in &complete {
            fs::remove_file(path).map_err(|e| PersistError::io(path, e))?;
        }
        if let Some((path, records, keep)) = &partial {
            if *keep == 0 {
                fs::remove_file(path).map_err(|e| PersistError::io(path, e))?;
            } else if *keep < records.len() {
                self.write_file(path, &self.codec.encode_history(&records[..*keep]))?;
            }
        }

        log::debug!(
            "consumed {} segments ({} partial) for player {player} in {world}: {} cells",
            complete.len(),
            usize::from(partial.is_some()),
            cells.len()
        );
        Ok(ConsumedEdits {
            cells,
            records: consumed,
        })
    }

    /// Read-only scan of every other player's archive in `world`: edits at or
    /// after `since` with their new values, oldest first per player.
    pub fn scan_for_reconciliation(
        &self,
        world: &str,
        since: Tick,
        exclude: PlayerId,
    ) -> Result<Vec<CellEdit>, PersistError> {
        layout::validate_world_name(world)?;
        let _guard = self.lock.lock();
        let world_dir = layout::world_dir(&self.base, world);

        let mut edits = Vec::new();
        for player in layout::list_players(&world_dir)? {
            if player == exclude {
                continue;
            }
            let dir = layout::player_dir(&self.base, world, player);
            let classified = classify(layout::list_files(&dir, HISTORY_EXTENSION)?, since);

            let oldest_first = classified
                .partial
                .into_iter()
                .chain(classified.complete.into_iter().rev());
            for (_, path) in oldest_first {
                let records = self.read_history(&path)?;
                edits.extend(
                    records
                        .iter()
                        .filter(|r| r.time >= since)
                        .map(|r| CellEdit {
                            pos: r.pos,
                            time: r.time,
                            block: r.new,
                        }),
                );
            }
        }
        Ok(edits)
    }

    /// Persist the values an undo overwrote. Nothing is written for an empty
    /// trail. A name collision moves the trail to the next free tick.
    pub fn append_redo_trail(
        &self,
        world: &str,
        player: PlayerId,
        created: Tick,
        entries: &[RedoRecord],
    ) -> Result<Option<PathBuf>, PersistError> {
        layout::validate_world_name(world)?;
        if entries.is_empty() {
            return Ok(None);
        }

        let _guard = self.lock.lock();
        let dir = layout::player_dir(&self.base, world, player);
        fs::create_dir_all(&dir).map_err(|e| PersistError::io(&dir, e))?;

        let mut tick = created;
        let mut path = layout::file_path(&dir, tick, REDO_EXTENSION);
        while path.exists() {
            tick = Tick(tick.0 + 1);
            path = layout::file_path(&dir, tick, REDO_EXTENSION);
        }
        self.write_file(&path, &self.codec.encode_redo(entries))?;
        log::debug!(
            "wrote redo trail {} ({} cells)",
            path.display(),
            entries.len()
        );
        Ok(Some(path))
    }

    /// Redo trails created at or after `since`, oldest first.
    pub fn read_redo_trails(
        &self,
        world: &str,
        player: PlayerId,
        since: Tick,
    ) -> Result<Vec<RedoTrail>, PersistError> {
        layout::validate_world_name(world)?;
        let _guard = self.lock.lock();
        let dir = layout::player_dir(&self.base, world, player);

        let mut trails = Vec::new();
        for (created, path) in layout::list_files(&dir, REDO_EXTENSION)? {
            if created < since {
                continue;
            }
            let entries = self.read_redo(&path)?;
            trails.push(RedoTrail {
                created,
                path,
                entries,
            });
        }
        Ok(trails)
    }

    /// Players with an archive directory under `world`.
    pub fn players(&self, world: &str) -> Result<Vec<PlayerId>, PersistError> {
        layout::validate_world_name(world)?;
        let _guard = self.lock.lock();
        layout::list_players(&layout::world_dir(&self.base, world))
    }

    /// History segments of one player, oldest first.
    pub fn segments(
        &self,
        world: &str,
        player: PlayerId,
    ) -> Result<Vec<(Tick, PathBuf)>, PersistError> {
        layout::validate_world_name(world)?;
        let _guard = self.lock.lock();
        layout::list_files(
            &layout::player_dir(&self.base, world, player),
            HISTORY_EXTENSION,
        )
    }

    /// Decode a single history segment file.
    pub fn read_segment(&self, path: &Path) -> Result<Vec<HistoryRecord>, PersistError> {
        let _guard = self.lock.lock();
        self.read_history(path)
    }

    /// Move a world's whole history to a new name. Returns false when the
    /// old world has no history.
    pub fn rename_world(&self, old: &str, new: &str) -> Result<bool, PersistError> {
        layout::validate_world_name(old)?;
        layout::validate_world_name(new)?;
        let _guard = self.lock.lock();
        let from = layout::world_dir(&self.base, old);
        let to = layout::world_dir(&self.base, new);
        if !from.is_dir() {
            return Ok(false);
        }
        if to.exists() {
            return Err(PersistError::io(
                &to,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "target world already has history",
                ),
            ));
        }
        fs::rename(&from, &to).map_err(|e| PersistError::io(&from, e))?;
        log::info!("moved history of world {old} to {new}");
        Ok(true)
    }

    fn read_body(&self, path: &Path, record_size: usize) -> Result<Vec<u8>, PersistError> {
        let packed = fs::read(path).map_err(|e| PersistError::io(path, e))?;
        let body = compress::decompress(&packed, self.compression)?;
        if body.len() % record_size != 0 {
            return Err(PersistError::CorruptSegment {
                path: path.to_path_buf(),
                len: body.len(),
                record_size,
            });
        }
        Ok(body)
    }

    fn read_history(&self, path: &Path) -> Result<Vec<HistoryRecord>, PersistError> {
        let body = self.read_body(path, HISTORY_RECORD_SIZE)?;
        self.codec.decode_history(&body)
    }

    fn read_redo(&self, path: &Path) -> Result<Vec<RedoRecord>, PersistError> {
        let body = self.read_body(path, REDO_RECORD_SIZE)?;
        self.codec.decode_redo(&body)
    }

    /// Compress and write via a temporary sibling, then rename into place.
    fn write_file(&self, path: &Path, body: &[u8]) -> Result<(), PersistError> {
        let packed = compress::compress(body, self.compression)?;
        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".");
        tmp.push(TEMP_SUFFIX);
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, packed).map_err(|e| PersistError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| PersistError::io(path, e))?;
        Ok(())
    }
}
