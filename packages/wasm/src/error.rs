//! Error types for the codec boundary

use phi_save_codec_types::RecordKind;
use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while talking to the codec guest
#[derive(Error, Debug)]
pub enum CodecError {
    /// Rejected at the host layer before reaching the guest
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Guest allocator returned a null pointer
    #[error("Guest allocation of {size} bytes failed: {message}")]
    Allocation { size: u32, message: String },

    /// Guest free reported failure
    #[error("Guest deallocation of {size} bytes at {ptr:#x} failed: {message}")]
    Deallocation { ptr: u32, size: u32, message: String },

    /// Guest codec function returned a null output pointer
    #[error("Invocation of {function} failed: {message}")]
    Invocation { function: String, message: String },

    /// Guest trapped while executing an export
    #[error("Guest trapped in {function}: {message}")]
    Trap { function: String, message: String },

    /// Guest output is not a valid MessagePack record
    #[error("Failed to decode {kind} record: {source}")]
    Decode {
        kind: RecordKind,
        #[source]
        source: rmp_serde::decode::Error,
    },

    /// Record could not be encoded to MessagePack
    #[error("Failed to encode {kind} record: {source}")]
    Encode {
        kind: RecordKind,
        #[source]
        source: rmp_serde::encode::Error,
    },

    /// `clear_last_error` was called with nothing pending
    #[error("No pending guest error to clear")]
    NoErrorToClear,

    /// Failed to compile or instantiate the guest module
    #[error("Instantiation error: {message}")]
    Instantiation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Required export not found in the guest module
    #[error("Missing required export: {export_name}")]
    MissingExport { export_name: String },

    /// Memory access outside the current linear memory
    #[error("Memory access out of bounds: {len} bytes at offset {ptr}, memory size is {memory_size}")]
    OutOfBounds {
        ptr: u32,
        len: usize,
        memory_size: usize,
    },

    /// Invalid configuration value or file
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CodecError::InvalidArgument(message.into())
    }

    pub fn instantiation(message: impl Into<String>) -> Self {
        CodecError::Instantiation {
            message: message.into(),
            source: None,
        }
    }

    pub fn instantiation_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CodecError::Instantiation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invocation(function: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Invocation {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn trap(function: impl Into<String>, error: impl std::fmt::Display) -> Self {
        CodecError::Trap {
            function: function.into(),
            message: format!("{error:#}"),
        }
    }

    pub fn missing_export(export_name: impl Into<String>) -> Self {
        CodecError::MissingExport {
            export_name: export_name.into(),
        }
    }

    /// Whether this error stems from loading the module rather than calling it
    pub fn is_instantiation(&self) -> bool {
        matches!(
            self,
            CodecError::Instantiation { .. } | CodecError::MissingExport { .. }
        )
    }

    /// Diagnostic text reported by the guest, if the error carries one
    pub fn guest_message(&self) -> Option<&str> {
        match self {
            CodecError::Allocation { message, .. }
            | CodecError::Deallocation { message, .. }
            | CodecError::Invocation { message, .. } => Some(message),
            _ => None,
        }
    }
}
