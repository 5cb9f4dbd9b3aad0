//! Compress and decompress subcommands

use anyhow::{Context, Result};
use flightdb_common::archive::{compress_file, decompress_archive};
use std::path::Path;

pub fn compress(input: &Path, output: Option<&Path>) -> Result<()> {
    let output = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("zip"),
    };
    let original_bytes = std::fs::metadata(input)
        .with_context(|| format!("Cannot read {}", input.display()))?
        .len();
    let compressed_bytes = compress_file(input, &output)?;
    let ratio = if original_bytes > 0 {
        100.0 * compressed_bytes as f64 / original_bytes as f64
    } else {
        100.0
    };

    println!(
        "Compressed {} ({} bytes) to {} ({} bytes, {:.1}% of original)",
        input.display(),
        original_bytes,
        output.display(),
        compressed_bytes,
        ratio
    );
    Ok(())
}

pub fn decompress(input: &Path, output_dir: &Path) -> Result<()> {
    let extracted = decompress_archive(input, output_dir)?;

    println!("Extracted {} file(s) from {}:", extracted.len(), input.display());
    for path in &extracted {
        println!("  {}", path.display());
    }
    Ok(())
}
