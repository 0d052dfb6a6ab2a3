//! Roundtrip command - check that an entry survives parse, build and parse.

use anyhow::{Context, Result};
use phi_save_codec_types::{same_value, RecordKind, RecordMap};
use phi_save_codec_wasm::CodecConfig;
use std::path::Path;

/// Run the roundtrip command.
pub fn run(config: &CodecConfig, module: &Path, kind: RecordKind, input: &Path) -> Result<()> {
    let mut codec = super::open_codec(config, module)?;
    let original = super::read_bytes(input)?;

    let parsed = codec
        .parse(kind, &original)
        .with_context(|| format!("Failed to parse {} as {}", input.display(), kind))?;
    let rebuilt = codec
        .build(kind, &parsed)
        .with_context(|| format!("Failed to rebuild {}", kind))?;
    let reparsed = codec
        .parse(kind, &rebuilt)
        .with_context(|| format!("Failed to parse rebuilt {}", kind))?;

    println!("Roundtrip for: {} ({})", input.display(), kind);
    println!(
        "  {} bytes in, {} bytes rebuilt{}",
        original.len(),
        rebuilt.len(),
        if rebuilt == original { ", identical" } else { "" }
    );

    let differing = differing_fields(&parsed, &reparsed);
    if differing.is_empty() {
        println!("✓ Rebuilt entry parses to the same record");
        Ok(())
    } else {
        println!("✗ Rebuilt entry differs in:");
        for field in &differing {
            println!("  - {}", field);
        }
        anyhow::bail!("{} field(s) changed across the roundtrip", differing.len())
    }
}

/// Top-level keys whose values differ between the two records.
///
/// Floats are compared by bit pattern, so a NaN that survives is not a change.
fn differing_fields(before: &RecordMap, after: &RecordMap) -> Vec<String> {
    let mut keys: Vec<&str> = before.keys().chain(after.keys()).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.into_iter()
        .filter(|key| match (before.get(key), after.get(key)) {
            (Some(a), Some(b)) => !same_value(a, b),
            _ => true,
        })
        .map(str::to_string)
        .collect()
}
