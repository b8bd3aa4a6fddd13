//! Decompress command implementation.

use crate::utils::decoded_path;
use oxitiny_codec::decompress;
use std::fs;
use std::path::Path;

pub fn cmd_decompress(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let decompressed = decompress(&data)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| decoded_path(input));
    fs::write(&output, &decompressed)?;

    println!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        data.len(),
        decompressed.len()
    );
    Ok(())
}
