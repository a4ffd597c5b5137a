//! Directory layout of the archive. The layout is also the index:
//! `<base>/<world>/<player>/<tick>.<ext>`, no manifest.

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blocklog_core::types::{PlayerId, Tick};

use crate::error::PersistError;

/// A world name must be a single, ordinary path component.
pub fn validate_world_name(world: &str) -> Result<(), PersistError> {
    let bad = world.is_empty()
        || world == "."
        || world == ".."
        || world.contains(['/', '\\', '\0']);
    if bad {
        return Err(PersistError::InvalidWorldName(world.to_string()));
    }
    Ok(())
}

pub fn world_dir(base: &Path, world: &str) -> PathBuf {
    base.join(world)
}

pub fn player_dir(base: &Path, world: &str, player: PlayerId) -> PathBuf {
    world_dir(base, world).join(player.to_string())
}

pub fn file_path(dir: &Path, tick: Tick, extension: &str) -> PathBuf {
    dir.join(format!("{tick}.{extension}"))
}

/// Tick encoded in a file name, if the name is `<digits>.<extension>`.
pub fn parse_file_tick(path: &Path, extension: &str) -> Option<Tick> {
    if path.extension() != Some(OsStr::new(extension)) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok().map(Tick)
}

/// List `<tick>.<extension>` files in a directory, oldest first.
/// A missing directory is an empty listing.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<(Tick, PathBuf)>, PersistError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PersistError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PersistError::io(dir, e))?;
        let path = entry.path();
        match parse_file_tick(&path, extension) {
            Some(tick) => files.push((tick, path)),
            None => log::trace!("ignoring {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Player directories under a world, in id order.
pub fn list_players(world_dir: &Path) -> Result<Vec<PlayerId>, PersistError> {
    let entries = match fs::read_dir(world_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PersistError::io(world_dir, e)),
    };

    let mut players = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PersistError::io(world_dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| PersistError::io(entry.path(), e))?
            .is_dir();
        if !is_dir {
            continue;
        }
        if let Some(id) = entry.file_name().to_str().and_then(|s| s.parse().ok()) {
            players.push(PlayerId(id));
        }
    }
    players.sort();
    Ok(players)
}
