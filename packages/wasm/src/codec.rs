//! Host-facing codec API
//!
//! `SaveCodec` is what applications hold: one guest instance, typed
//! `parse_<kind>` / `build_<kind>` pairs, and the untyped `parse` / `build`
//! fallback. Guest error-slot handling stays inside; every call returns a
//! `CodecResult`.

use crate::engine::{CodecConfig, CodecEngine};
use crate::error::CodecResult;
use crate::instance::CodecInstance;
use crate::module::ModuleSource;
use phi_save_codec_types::{
    GameKey, GameProgress, GameRecord, RecordKind, RecordMap, SaveRecord, Settings, Summary, User,
};

/// A codec guest instance with the record-level API
#[derive(Debug)]
pub struct SaveCodec {
    instance: CodecInstance,
}

macro_rules! record_methods {
    ($($record:ty => $parse:ident, $build:ident;)*) => {
        $(
            pub fn $parse(&mut self, bytes: &[u8]) -> CodecResult<$record> {
                self.parse_record::<$record>(bytes)
            }

            pub fn $build(&mut self, record: &$record) -> CodecResult<Vec<u8>> {
                self.build_record(record)
            }
        )*
    };
}

impl SaveCodec {
    /// Open a codec module with the default configuration
    pub fn open(source: impl Into<ModuleSource>) -> CodecResult<Self> {
        Self::open_with_config(source, &CodecConfig::default())
    }

    pub fn open_with_config(
        source: impl Into<ModuleSource>,
        config: &CodecConfig,
    ) -> CodecResult<Self> {
        let engine = CodecEngine::new(config.clone())?;
        Ok(Self::from_instance(engine.open(source)?))
    }

    pub fn from_instance(instance: CodecInstance) -> Self {
        Self { instance }
    }

    /// Parse a binary save entry into an untyped record
    pub fn parse(&mut self, kind: RecordKind, bytes: &[u8]) -> CodecResult<RecordMap> {
        self.instance.parse(kind, bytes)
    }

    /// Build a binary save entry from an untyped record
    pub fn build(&mut self, kind: RecordKind, record: &RecordMap) -> CodecResult<Vec<u8>> {
        self.instance.build(kind, record)
    }

    pub fn parse_record<T: SaveRecord>(&mut self, bytes: &[u8]) -> CodecResult<T> {
        self.instance.parse_record(bytes)
    }

    pub fn build_record<T: SaveRecord>(&mut self, record: &T) -> CodecResult<Vec<u8>> {
        self.instance.build_record(record)
    }

    record_methods! {
        User => parse_user, build_user;
        Summary => parse_summary, build_summary;
        GameRecord => parse_game_record, build_game_record;
        GameProgress => parse_game_progress, build_game_progress;
        GameKey => parse_game_key, build_game_key;
        Settings => parse_settings, build_settings;
    }

    /// Current guest linear memory size in bytes
    pub fn memory_size(&self) -> usize {
        self.instance.memory_size()
    }

    pub fn instance(&self) -> &CodecInstance {
        &self.instance
    }

    /// Low-level access to the boundary protocol
    pub fn instance_mut(&mut self) -> &mut CodecInstance {
        &mut self.instance
    }

    pub fn into_instance(self) -> CodecInstance {
        self.instance
    }
}
