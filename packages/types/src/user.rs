//! Player profile record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub version: u8,
    /// Whether the player id is shown on the profile card
    pub show_player_id: bool,
    pub self_intro: String,
    /// Avatar asset name
    pub avatar: String,
    /// Background illustration name
    pub background: String,
}

impl SaveRecord for User {
    const KIND: RecordKind = RecordKind::User;
}
