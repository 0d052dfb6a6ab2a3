//! Story and unlock progress record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBase {
    pub is_first_run: bool,
    pub legacy_chapter_finished: bool,
    pub already_show_collection_tip: bool,
    pub already_show_auto_unlock_in_tip: bool,
}

/// Data currency, one counter per unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub kib: u16,
    pub mib: u16,
    pub gib: u16,
    pub tib: u16,
    pub pib: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter8Base {
    pub unlock_begin: bool,
    pub unlock_second_phase: bool,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProgress {
    /// The guest rejects versions below 3
    pub version: u8,
    pub base: ProgressBase,
    pub completed: String,
    pub song_update_info: u16,
    pub challenge_mode_rank: u16,
    pub money: Money,
    pub unlock_flag_of_spasmodic: [bool; 4],
    pub unlock_flag_of_igallta: [bool; 4],
    pub unlock_flag_of_rrharil: [bool; 4],
    pub flag_of_song_record_key: [bool; 8],
    pub random_version_unlocked: [bool; 6],
    pub chapter8_base: Chapter8Base,
    pub chapter8_song_unlocked: [bool; 6],
    /// Present from version 4 on
    pub flag_of_song_record_key_takumi: Option<[bool; 3]>,
}

impl SaveRecord for GameProgress {
    const KIND: RecordKind = RecordKind::GameProgress;
}
