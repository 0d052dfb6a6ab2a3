//! ABI definitions for the codec guest
//!
//! Defines the export contract between the host and the codec module. All
//! pointers and sizes are wasm32 `i32` values read as unsigned.

use phi_save_codec_types::RecordKind;
use serde::{Deserialize, Serialize};
use wasmtime::TypedFunc;

/// Default export names, matching the codec's release build
pub mod exports {
    /// Linear memory shared with the host
    pub const MEMORY: &str = "memory";

    /// Allocate a guest buffer for the host to write into
    /// Signature: (size: i32) -> i32 (pointer, 0 on failure)
    pub const ALLOCATE: &str = "malloc";

    /// Release a buffer previously handed out by either side
    /// Signature: (ptr: i32, size: i32) -> i32 (0 on failure)
    pub const FREE: &str = "free";

    /// Hand the pending error message to the host
    /// Signature: () -> (size: i32, ptr: i32), (0, 0) when nothing is pending
    pub const GET_LAST_ERROR: &str = "get_last_error";

    /// Drop the pending error message
    /// Signature: () -> i32 (0 when nothing was pending)
    pub const CLEAR_LAST_ERROR: &str = "clear_last_error";
}

/// `parse_<kind>` / `build_<kind>`: (ptr, size) -> (out_size, out_ptr)
pub type CodecFunc = TypedFunc<(u32, u32), (u32, u32)>;

/// Names under which the guest exports its ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportNames {
    /// Prepended to `parse_<kind>` and `build_<kind>`
    pub call_prefix: String,
    pub memory: String,
    pub allocate: String,
    pub free: String,
    pub get_last_error: String,
    pub clear_last_error: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            call_prefix: String::new(),
            memory: exports::MEMORY.to_string(),
            allocate: exports::ALLOCATE.to_string(),
            free: exports::FREE.to_string(),
            get_last_error: exports::GET_LAST_ERROR.to_string(),
            clear_last_error: exports::CLEAR_LAST_ERROR.to_string(),
        }
    }
}

impl ExportNames {
    /// Full export symbol for an unprefixed codec function name
    pub fn codec_export(&self, function: &str) -> String {
        format!("{}{}", self.call_prefix, function)
    }

    /// Unprefixed parse/build function names for every record kind
    pub fn codec_functions() -> impl Iterator<Item = String> {
        RecordKind::ALL
            .into_iter()
            .flat_map(|kind| [kind.parse_export(), kind.build_export()])
    }

    /// Allocator and error-slot exports, in resolution order
    pub fn runtime_exports(&self) -> [&str; 4] {
        [
            &self.allocate,
            &self.free,
            &self.get_last_error,
            &self.clear_last_error,
        ]
    }
}
