//! Bench command implementation.

use crate::utils::{
    DECODED_EXTENSION, ENCODED_EXTENSION, config_for_effort, create_progress_bar,
    megabytes_per_second, ratio_percent, with_added_extension,
};
use log::debug;
use oxitiny_codec::stream::CHUNK_LEN;
use oxitiny_codec::{compress, decompress};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// JSON report for one benchmark run.
#[derive(Debug, Serialize, Deserialize)]
struct BenchReport {
    file: String,
    effort: u8,
    loops: u32,
    superblocks: usize,
    original_size: usize,
    compressed_size: usize,
    ratio: f64,
    compress_mb_s: f64,
    decompress_mb_s: f64,
    verified: bool,
}

pub fn cmd_bench(
    file: &Path,
    effort: u8,
    loops: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let original = fs::read(file)?;
    let config = config_for_effort(effort);
    let show_progress = loops > 1 && !json;

    let pb = create_progress_bar(loops as u64, show_progress);
    pb.set_message("compressing");
    let start = Instant::now();
    let mut compressed = Vec::new();
    for _ in 0..loops {
        compressed = compress(&original, &config)?;
        pb.inc(1);
    }
    let compress_secs = start.elapsed().as_secs_f64();
    pb.finish_and_clear();

    let pb = create_progress_bar(loops as u64, show_progress);
    pb.set_message("decompressing");
    let start = Instant::now();
    let mut decompressed = Vec::new();
    for _ in 0..loops {
        decompressed = decompress(&compressed)?;
        pb.inc(1);
    }
    let decompress_secs = start.elapsed().as_secs_f64();
    pb.finish_and_clear();

    let encoded_path = with_added_extension(file, ENCODED_EXTENSION);
    let decoded_path = with_added_extension(file, DECODED_EXTENSION);
    fs::write(&encoded_path, &compressed)?;
    fs::write(&decoded_path, &decompressed)?;
    debug!(
        "wrote {} and {}",
        encoded_path.display(),
        decoded_path.display()
    );

    let report = BenchReport {
        file: file.display().to_string(),
        effort,
        loops,
        superblocks: original.len().div_ceil(CHUNK_LEN),
        original_size: original.len(),
        compressed_size: compressed.len(),
        ratio: ratio_percent(original.len(), compressed.len()),
        compress_mb_s: megabytes_per_second(original.len(), loops, compress_secs),
        decompress_mb_s: megabytes_per_second(original.len(), loops, decompress_secs),
        verified: decompressed == original,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.verified {
        return Err(format!(
            "round-trip mismatch: {} bytes in, {} bytes out",
            original.len(),
            decompressed.len()
        )
        .into());
    }
    Ok(())
}

fn print_report(report: &BenchReport) {
    println!("File: {}", report.file);
    println!(
        "  Effort: {}  Loops: {}  Superblocks: {}",
        report.effort, report.loops, report.superblocks
    );
    println!("  Original size:   {:>10} bytes", report.original_size);
    println!("  Compressed size: {:>10} bytes", report.compressed_size);
    println!("  Ratio:           {:>10.2}%", report.ratio);
    println!("  Compress:        {:>10.2} MB/s", report.compress_mb_s);
    println!("  Decompress:      {:>10.2} MB/s", report.decompress_mb_s);
    println!(
        "  Round trip:      {:>10}",
        if report.verified { "OK" } else { "FAILED" }
    );
}
