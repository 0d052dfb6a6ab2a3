//! MessagePack envelope around the call protocol
//!
//! Records travel as MessagePack maps with named fields in both directions.
//! The host does not validate their schema; the guest owns it.

use crate::error::{CodecError, CodecResult};
use crate::instance::CodecInstance;
use phi_save_codec_types::{RecordKind, RecordMap, SaveRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a record as a MessagePack map
pub fn encode<T: Serialize + ?Sized>(kind: RecordKind, record: &T) -> CodecResult<Vec<u8>> {
    rmp_serde::to_vec_named(record).map_err(|source| CodecError::Encode { kind, source })
}

/// Decode a MessagePack record
pub fn decode<T: DeserializeOwned>(kind: RecordKind, bytes: &[u8]) -> CodecResult<T> {
    rmp_serde::from_slice(bytes).map_err(|source| CodecError::Decode { kind, source })
}

impl CodecInstance {
    /// Parse a binary save entry into an untyped record
    pub fn parse(&mut self, kind: RecordKind, bytes: &[u8]) -> CodecResult<RecordMap> {
        let output = self.invoke(&kind.parse_export(), bytes)?;
        decode(kind, &output)
    }

    /// Build a binary save entry from an untyped record
    pub fn build(&mut self, kind: RecordKind, record: &RecordMap) -> CodecResult<Vec<u8>> {
        let input = encode(kind, record)?;
        self.invoke(&kind.build_export(), &input)
    }

    pub fn parse_record<T: SaveRecord>(&mut self, bytes: &[u8]) -> CodecResult<T> {
        let output = self.invoke(&T::KIND.parse_export(), bytes)?;
        decode(T::KIND, &output)
    }

    pub fn build_record<T: SaveRecord>(&mut self, record: &T) -> CodecResult<Vec<u8>> {
        let input = encode(T::KIND, record)?;
        self.invoke(&T::KIND.build_export(), &input)
    }
}
