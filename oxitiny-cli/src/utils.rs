//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxitiny_codec::{CodecConfig, Effort};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension added to compressed files.
pub const ENCODED_EXTENSION: &str = "encoded";

/// Extension added to decompressed files.
pub const DECODED_EXTENSION: &str = "decoded";

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Codec configuration for a command-line effort level.
pub fn config_for_effort(level: u8) -> CodecConfig {
    CodecConfig::with_effort(Effort::from_level(level).unwrap_or_default())
}

/// `path` with `.ext` appended to its full file name.
pub fn with_added_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Default output path for `decompress`: strip `.encoded`, then add `.decoded`.
pub fn decoded_path(input: &Path) -> PathBuf {
    let base = if input.extension().is_some_and(|ext| ext == ENCODED_EXTENSION) {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };
    with_added_extension(&base, DECODED_EXTENSION)
}

/// Compression ratio as a percentage of the original size.
pub fn ratio_percent(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        compressed as f64 * 100.0 / original as f64
    }
}

/// Throughput in MB/s for `bytes` processed `loops` times in `seconds`.
pub fn megabytes_per_second(bytes: usize, loops: u32, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * loops as f64) / (1024.0 * 1024.0) / seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        assert_eq!(
            with_added_extension(Path::new("data/record.json"), ENCODED_EXTENSION),
            PathBuf::from("data/record.json.encoded")
        );
        assert_eq!(
            decoded_path(Path::new("record.json.encoded")),
            PathBuf::from("record.json.decoded")
        );
        assert_eq!(
            decoded_path(Path::new("record.bin")),
            PathBuf::from("record.bin.decoded")
        );
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio_percent(0, 0), 0.0);
        assert_eq!(ratio_percent(200, 50), 25.0);
    }

    #[test]
    fn test_effort_levels() {
        assert_eq!(config_for_effort(0).effort, Effort::Fast);
        assert_eq!(config_for_effort(1).effort, Effort::Thorough);
    }
}
