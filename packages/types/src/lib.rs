//! Record types for the phi save codec
//!
//! The codec guest owns the binary save format. What crosses the sandbox
//! boundary is a MessagePack map per record; this crate gives each of the six
//! record kinds its own typed shape so callers do not have to pass open-ended
//! maps around.

pub mod game_key;
pub mod game_progress;
pub mod game_record;
pub mod kind;
pub mod record;
pub mod settings;
pub mod summary;
pub mod user;

pub use game_key::{GameKey, Key};
pub use game_progress::{Chapter8Base, GameProgress, Money, ProgressBase};
pub use game_record::{GameRecord, LevelRecord, SongRecord, DIFFICULTIES};
pub use kind::{RecordKind, UnknownRecordKind};
pub use record::{same_value, RecordMap, RecordValue, SaveRecord};
pub use settings::{Settings, SettingsBase};
pub use summary::{Level, MultiLevel, Summary};
pub use user::User;
