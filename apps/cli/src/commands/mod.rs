//! CLI command implementations.

pub mod build;
pub mod parse;
pub mod roundtrip;

use anyhow::{Context, Result};
use phi_save_codec_types::RecordMap;
use phi_save_codec_wasm::{CodecConfig, SaveCodec};
use std::path::Path;

/// Load codec configuration from a TOML file, or from the environment
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let config = match path {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecConfig::from_env().context("Invalid PHI_CODEC_* environment")?,
    };
    tracing::debug!(?config, "Codec configuration");
    Ok(config)
}

pub fn open_codec(config: &CodecConfig, module: &Path) -> Result<SaveCodec> {
    SaveCodec::open_with_config(module, config)
        .with_context(|| format!("Failed to open codec module {}", module.display()))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read a JSON object from file
///
/// JSON numbers become MessagePack integers or `f64`; the guest narrows them
/// to its field types.
pub fn read_record(path: &Path) -> Result<RecordMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?
    {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value)
            .with_context(|| format!("Invalid record in {}", path.display())),
        other => anyhow::bail!(
            "{} must contain a JSON object, found {}",
            path.display(),
            json_type(&other)
        ),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
