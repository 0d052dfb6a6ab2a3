//! Record kinds understood by the codec guest

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selects which `parse_<kind>` / `build_<kind>` export pair to call.
///
/// The set is closed: it mirrors the guest module's export surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Summary,
    GameRecord,
    GameProgress,
    GameKey,
    Settings,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::User,
        RecordKind::Summary,
        RecordKind::GameRecord,
        RecordKind::GameProgress,
        RecordKind::GameKey,
        RecordKind::Settings,
    ];

    /// Name used in export symbols, e.g. `game_record`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Summary => "summary",
            Self::GameRecord => "game_record",
            Self::GameProgress => "game_progress",
            Self::GameKey => "game_key",
            Self::Settings => "settings",
        }
    }

    /// Unprefixed name of the guest parse export
    pub fn parse_export(&self) -> String {
        format!("parse_{}", self.as_str())
    }

    /// Unprefixed name of the guest build export
    pub fn build_export(&self) -> String {
        format!("build_{}", self.as_str())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record kind `{0}`")]
pub struct UnknownRecordKind(pub String);

impl FromStr for RecordKind {
    type Err = UnknownRecordKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownRecordKind(s.to_string()))
    }
}
