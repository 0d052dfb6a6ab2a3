//! Phi Save Codec host runtime
//!
//! The save codec runs as a WebAssembly guest inside wasmtime. This crate is
//! the host side of its boundary: it moves MessagePack records in and out of
//! guest linear memory through the guest's own allocator, and turns the
//! guest's single-slot error holder into ordinary `Result`s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SaveCodec        parse_<kind> / build_<kind>                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │ envelope         MessagePack encode / decode                 │
//! │ invoke           alloc → write → call → read → free          │
//! │ alloc            GuestBuffer, ScopedBuffer                   │
//! │ error_channel    get / clear / take last error               │
//! │ memory           bounds-checked linear memory access         │
//! ├──────────────────────────────────────────────────────────────┤
//! │ CodecEngine → CodecModule → CodecInstance      (wasmtime)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use phi_save_codec_wasm::SaveCodec;
//! use std::path::PathBuf;
//!
//! let mut codec = SaveCodec::open(PathBuf::from("phi_save_codec.wasm"))?;
//! let settings = codec.parse_settings(&bytes)?;
//! let rebuilt = codec.build_settings(&settings)?;
//! ```
//!
//! Instances are not synchronised. Serialise access to each one.

pub mod abi;
pub mod alloc;
pub mod codec;
pub mod engine;
pub mod envelope;
pub mod error;
mod error_channel;
pub mod instance;
mod invoke;
pub mod memory;
pub mod module;

pub use abi::{CodecFunc, ExportNames};
pub use alloc::{GuestBuffer, ScopedBuffer};
pub use codec::SaveCodec;
pub use engine::{CodecConfig, CodecEngine};
pub use error::{CodecError, CodecResult};
pub use instance::CodecInstance;
pub use memory::GuestMemory;
pub use module::{CodecModule, ModuleSource};
pub use phi_save_codec_types::{RecordKind, RecordMap, RecordValue, SaveRecord};
