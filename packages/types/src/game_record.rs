//! Per-song score record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Difficulty keys in the order the guest stores them.
pub const DIFFICULTIES: [&str; 5] = ["EZ", "HD", "IN", "AT", "Legacy"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub score: u32,
    /// Accuracy in percent
    pub acc: f32,
    pub fc: bool,
}

/// Unlocked difficulties of one song, keyed by entries of [`DIFFICULTIES`]
pub type SongRecord = BTreeMap<String, LevelRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub version: u8,
    pub songs: BTreeMap<String, SongRecord>,
}

impl GameRecord {
    pub fn level(&self, song: &str, difficulty: &str) -> Option<&LevelRecord> {
        self.songs.get(song)?.get(difficulty)
    }
}

impl SaveRecord for GameRecord {
    const KIND: RecordKind = RecordKind::GameRecord;
}
