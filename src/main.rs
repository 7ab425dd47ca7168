use clap::{Parser, Subcommand};
use filego::cli::{
    check_dir, merge_dir, parse_byte_size, show_info, split_file, CheckOptions, MergeOptions,
    SplitOptions,
};
use filego::pipeline::DEFAULT_CHUNK_SIZE;
use filego::FilegoError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("FILEGO_VERSION");
const BUILD: &str = env!("FILEGO_BUILD");
const PROFILE: &str = env!("FILEGO_PROFILE");
const GIT_HASH: &str = env!("FILEGO_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH)
    })
}

#[derive(Parser)]
#[command(name = "filego")]
#[command(author, about = "Split files into chunks, check them and merge them back", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into chunk files named 0, 1, 2, ...
    #[command(alias = "s")]
    Split {
        /// File to split
        input: PathBuf,

        /// Directory receiving the chunk files
        out_dir: PathBuf,

        /// Chunk size in bytes; accepts K, M and G suffixes
        #[arg(long, short = 'c', default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_size)]
        chunk_size: u64,

        /// Number of threads writing chunk files
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Check that a chunk directory is complete
    #[command(alias = "c")]
    Check {
        /// Directory holding the chunk files
        in_dir: PathBuf,

        /// Expected size of the original file in bytes
        #[arg(long, required = true)]
        file_size: u64,

        /// Expected number of chunks
        #[arg(long, required = true)]
        total_chunks: u64,
    },

    /// Merge a chunk directory back into a single file
    #[command(alias = "m")]
    Merge {
        /// Directory holding the chunk files
        in_dir: PathBuf,

        /// Output file
        output: PathBuf,

        /// Number of chunks to merge (defaults to the chunk files found)
        #[arg(long)]
        total_chunks: Option<u64>,
    },

    /// Show the chunk files held in a directory
    #[command(alias = "i")]
    Info {
        /// Directory holding the chunk files
        in_dir: PathBuf,
    },
}

fn parse_size(s: &str) -> Result<u64, String> {
    parse_byte_size(s).map_err(|e| format!("{}", e))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("filego={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, json: bool) -> Result<bool, FilegoError> {
    match command {
        Commands::Split {
            input,
            out_dir,
            chunk_size,
            workers,
        } => {
            let mut options = SplitOptions {
                chunk_size,
                ..Default::default()
            };
            if let Some(workers) = workers {
                options.workers = workers;
            }

            let summary = split_file(&input, &out_dir, &options)?;
            if json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!(
                    "Split {} bytes into {} chunks in {}",
                    summary.file_size,
                    summary.total_chunks,
                    out_dir.display()
                );
            }
            Ok(true)
        }

        Commands::Check {
            in_dir,
            file_size,
            total_chunks,
        } => {
            let options = CheckOptions {
                file_size,
                total_chunks,
            };
            let result = check_dir(&in_dir, &options)?;
            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                match &result.error {
                    None => println!("Check passed: {} chunks, {} bytes", total_chunks, file_size),
                    Some(failure) => println!("Check failed ({}): {}", failure.kind(), failure),
                }
            }
            Ok(result.success)
        }

        Commands::Merge {
            in_dir,
            output,
            total_chunks,
        } => {
            let options = MergeOptions { total_chunks };
            let written = merge_dir(&in_dir, &output, &options)?;
            if json {
                println!("{}", serde_json::json!({ "bytes": written }));
            } else {
                println!("Merged {} bytes to {}", written, output.display());
            }
            Ok(true)
        }

        Commands::Info { in_dir } => {
            let info = show_info(&in_dir)?;
            if json {
                println!("{}", serde_json::to_string(&info)?);
            } else {
                print!("{}", info);
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("filego {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_tracing(cli.verbose);

    match run(command, cli.json) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
