//! Parse command - decode a binary save entry into JSON.

use anyhow::{Context, Result};
use phi_save_codec_types::RecordKind;
use phi_save_codec_wasm::CodecConfig;
use std::path::Path;

/// Run the parse command.
///
/// JSON cannot express NaN or infinities; such floats print as `null`.
pub fn run(
    config: &CodecConfig,
    module: &Path,
    kind: RecordKind,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut codec = super::open_codec(config, module)?;
    let bytes = super::read_bytes(input)?;

    tracing::info!(%kind, input = %input.display(), size = bytes.len(), "Parsing save entry");

    let record = codec
        .parse(kind, &bytes)
        .with_context(|| format!("Failed to parse {} as {}", input.display(), kind))?;
    let json = serde_json::to_string_pretty(&record)?;

    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
