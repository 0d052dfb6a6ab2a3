//! Cloud save summary record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};

/// Clear / full-combo / all-perfect counts for one difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub clear: u16,
    pub fc: u16,
    pub phi: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiLevel {
    pub ez: Level,
    pub hd: Level,
    pub r#in: Level,
    pub at: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub save_version: u8,
    pub challenge_mode_rank: u16,
    pub rks: f32,
    pub game_version: u16,
    pub avatar: String,
    pub level: MultiLevel,
}

impl SaveRecord for Summary {
    const KIND: RecordKind = RecordKind::Summary;
}
