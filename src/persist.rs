use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::MatchState;

const CACHE_DIR: &str = "crease_terminal";
const LIVE_FILE: &str = "live_match.json";
const HISTORY_FILE: &str = "match_history.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LiveFile {
    version: u32,
    state: MatchState,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HistoryFile {
    version: u32,
    matches: Vec<MatchRecord>,
}

/// A finalized match appended to the history log once `is_match_over` flips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub completed_at: String,
    pub state: MatchState,
}

/// Loads the in-progress match, if a readable one is on disk. Any failure
/// (missing file, parse error, stale version) means "no saved match". The
/// undo slot is serde-skipped, so loads always come back with it empty.
pub fn load_saved_match() -> Option<MatchState> {
    let path = live_path()?;
    let raw = fs::read_to_string(&path).ok()?;
    let file = serde_json::from_str::<LiveFile>(&raw).ok()?;
    if file.version != CACHE_VERSION {
        return None;
    }
    Some(file.state)
}

pub fn save_live_match(state: &MatchState) -> Result<()> {
    let Some(path) = live_path() else {
        return Ok(());
    };
    let file = LiveFile {
        version: CACHE_VERSION,
        state: state.clone(),
    };
    let json = serde_json::to_string(&file).context("serialize live match")?;
    write_atomic(&path, &json)
}

pub fn clear_saved_match() {
    if let Some(path) = live_path() {
        let _ = fs::remove_file(path);
    }
}

pub fn load_history() -> Vec<MatchRecord> {
    let Some(path) = history_path() else {
        return Vec::new();
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    let Ok(file) = serde_json::from_str::<HistoryFile>(&raw) else {
        return Vec::new();
    };
    if file.version != CACHE_VERSION {
        return Vec::new();
    }
    file.matches
}

/// Appends one finalized match, de-duplicated by id, newest first.
pub fn append_history(record: &MatchRecord) -> Result<Vec<MatchRecord>> {
    let mut matches = load_history();
    matches.retain(|m| m.id != record.id);
    matches.insert(0, record.clone());

    if let Some(path) = history_path() {
        let file = HistoryFile {
            version: CACHE_VERSION,
            matches: matches.clone(),
        };
        let json = serde_json::to_string(&file).context("serialize match history")?;
        write_atomic(&path, &json)?;
    }
    Ok(matches)
}

fn write_atomic(path: &Path, json: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn live_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LIVE_FILE))
}

fn history_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(HISTORY_FILE))
}

fn cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
