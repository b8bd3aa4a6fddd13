//! Compress command implementation.

use crate::utils::{ENCODED_EXTENSION, config_for_effort, ratio_percent, with_added_extension};
use log::info;
use oxitiny_codec::compress;
use std::fs;
use std::path::Path;

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    effort: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let config = config_for_effort(effort);
    let compressed = compress(&data, &config)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| with_added_extension(input, ENCODED_EXTENSION));
    fs::write(&output, &compressed)?;
    info!("effort {} ({:?})", effort, config.effort);

    println!(
        "{} -> {} ({} -> {} bytes, {:.1}%)",
        input.display(),
        output.display(),
        data.len(),
        compressed.len(),
        ratio_percent(data.len(), compressed.len())
    );
    Ok(())
}
