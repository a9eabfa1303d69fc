#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "micropkg")]
#[command(author, version, about = "Flag npm packages too small to be worth a dependency", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Classify the latest release of one or more npm packages
    Analyze {
        /// Package names (e.g., "is-odd", "left-pad")
        #[arg(required = true)]
        packages: Vec<String>,

        /// JSON file with analysis options (maxFileSize, maxFiles, excludeFiles, excludeExtensions)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Size budget per file, in bytes of comment-free code
        #[arg(long, value_name = "BYTES")]
        max_file_size: Option<u64>,

        /// Maximum number of measured files
        #[arg(long, value_name = "COUNT")]
        max_files: Option<u64>,

        /// Basenames to skip (replaces the defaults)
        #[arg(long = "exclude-file", value_delimiter = ',', value_name = "NAME")]
        exclude_files: Vec<String>,

        /// Extensions to skip, compared with the text after the last '.' (replaces the defaults)
        #[arg(long = "exclude-ext", value_delimiter = ',', value_name = "EXT")]
        exclude_extensions: Vec<String>,

        /// Registry URL (defaults to $MICROPKG_NPM_REGISTRY, then registry.npmjs.org)
        #[arg(long, value_name = "URL")]
        registry: Option<String>,

        /// Give up on a package after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Analyze {
            packages,
            config,
            max_file_size,
            max_files,
            exclude_files,
            exclude_extensions,
            registry,
            timeout,
        }) => {
            let action = commands::analyze::AnalyzeAction {
                packages,
                config,
                max_file_size,
                max_files,
                exclude_files,
                exclude_extensions,
                registry,
                timeout: timeout.map(Duration::from_secs),
            };
            let span = tracing::info_span!("analyze", cmd = "analyze");
            let _guard = span.enter();
            commands::analyze::run(action, cli.json)
        }
    }
}
