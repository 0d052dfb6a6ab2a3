//! Build command - encode a JSON record into a binary save entry.

use anyhow::{Context, Result};
use phi_save_codec_types::RecordKind;
use phi_save_codec_wasm::CodecConfig;
use std::path::Path;

/// Run the build command.
pub fn run(
    config: &CodecConfig,
    module: &Path,
    kind: RecordKind,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let record = super::read_record(input)?;
    let mut codec = super::open_codec(config, module)?;

    tracing::info!(%kind, input = %input.display(), fields = record.len(), "Building save entry");

    let bytes = codec
        .build(kind, &record)
        .with_context(|| format!("Failed to build {} from {}", kind, input.display()))?;

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}
