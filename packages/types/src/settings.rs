//! Client settings record

use crate::kind::RecordKind;
use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsBase {
    pub chord_support: bool,
    pub fc_ap_indicator: bool,
    pub enable_hit_sound: bool,
    pub low_resolution_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u8,
    pub base: SettingsBase,
    pub device_name: String,
    pub bright: f32,
    pub music_volume: f32,
    pub effect_volume: f32,
    pub hit_sound_volume: f32,
    /// Audio offset in seconds
    pub sound_offset: f32,
    pub note_scale: f32,
}

impl SaveRecord for Settings {
    const KIND: RecordKind = RecordKind::Settings;
}
