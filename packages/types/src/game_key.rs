//! Collection and unlock key record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flags stored for a single key; absent fields were not present in the save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub read_collection_piece_num: Option<u8>,
    pub unlock_single: Option<bool>,
    pub unlock_collection_piece_num: Option<u8>,
    pub unlock_illustration: Option<bool>,
    pub unlock_avatar: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameKey {
    pub version: u8,
    pub keys: BTreeMap<String, Key>,
    pub lanota_read_keys: [bool; 6],
    /// Version 2 and later
    pub camellia_read_key: Option<bool>,
    /// Version 3 and later
    pub side_story4_begin_read_key: Option<bool>,
    /// Version 3 and later
    pub old_score_cleared_v390: Option<bool>,
}

impl SaveRecord for GameKey {
    const KIND: RecordKind = RecordKind::GameKey;
}
