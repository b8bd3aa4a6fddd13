//! OxiTiny CLI - compression for tiny inputs
//!
//! Drives the superblock codec over whole files, 512 bytes at a time.

mod commands;
mod utils;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{cmd_bench, cmd_compress, cmd_decompress};
use oxitiny_codec::TinyError;
use std::io;
use std::path::PathBuf;

/// Exit code for a missing command-line argument.
const EXIT_MISSING_ARGUMENT: i32 = 14;

#[derive(Parser)]
#[command(name = "oxitiny")]
#[command(author, version, about = "Lossless compression for inputs of 1 to 512 bytes")]
#[command(long_about = "
OxiTiny compresses data in self-describing superblocks of at most 512 bytes.
Larger files are cut into 512-byte chunks that are coded independently.

Examples:
  oxitiny bench record.json
  oxitiny bench record.json --effort 1 --loops 1000
  oxitiny compress record.json
  oxitiny decompress record.json.encoded -o record.json
  oxitiny completions bash > oxitiny.bash
")]
struct Cli {
    /// Log codec decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress, decompress and verify a file, reporting size and speed
    #[command(alias = "b")]
    Bench {
        /// File to benchmark
        file: PathBuf,

        /// Compression effort (0 = fast, 1 = thorough)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
        effort: u8,

        /// Number of timed compress and decompress loops
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        loops: u32,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: <INPUT>.encoded)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression effort (0 = fast, 1 = thorough)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
        effort: u8,
    },

    /// Decompress a file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: <INPUT> without .encoded, plus .decoded)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            let _ = e.print();
            std::process::exit(EXIT_MISSING_ARGUMENT);
        }
        Err(e) => e.exit(),
    };

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Bench {
            file,
            effort,
            loops,
            json,
        } => cmd_bench(&file, effort, loops, json),
        Commands::Compress {
            input,
            output,
            effort,
        } => cmd_compress(&input, output.as_deref(), effort),
        Commands::Decompress { input, output } => cmd_decompress(&input, output.as_deref()),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "oxitiny", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(e.as_ref()));
    }
}

/// Map a command failure onto the process exit code.
fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    if let Some(e) = err.downcast_ref::<TinyError>() {
        return e.exit_code();
    }
    match err.downcast_ref::<io::Error>() {
        Some(e) if e.kind() == io::ErrorKind::NotFound => 9,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bench() {
        let cli = Cli::try_parse_from(["oxitiny", "bench", "data.bin", "-e", "1", "-l", "20"]).unwrap();
        match cli.command {
            Commands::Bench { effort, loops, .. } => {
                assert_eq!(effort, 1);
                assert_eq!(loops, 20);
            }
            _ => panic!("expected bench"),
        }
    }

    #[test]
    fn test_effort_out_of_range() {
        assert!(Cli::try_parse_from(["oxitiny", "bench", "data.bin", "-e", "2"]).is_err());
    }

    #[test]
    fn test_missing_argument() {
        let err = Cli::try_parse_from(["oxitiny", "bench"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_exit_codes() {
        let not_found: Box<dyn std::error::Error> =
            Box::new(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(exit_code(not_found.as_ref()), 9);

        let corrupt: Box<dyn std::error::Error> = Box::new(TinyError::corrupted(0, "bad tag"));
        assert_eq!(exit_code(corrupt.as_ref()), 3);

        let mismatch: Box<dyn std::error::Error> = "round-trip mismatch".into();
        assert_eq!(exit_code(mismatch.as_ref()), 1);
    }
}
