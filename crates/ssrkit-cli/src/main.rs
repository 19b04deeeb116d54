#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use ssrkit_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssrkit")]
#[command(author, version, about = "Compile and host SSR component bundles", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Bundle component entry points
    Build {
        /// Entry points (defaults to the components listed in ssrkit.json)
        entries: Vec<PathBuf>,

        /// Write bundles and a manifest to this directory
        #[arg(long, short = 'o', value_name = "DIR")]
        outdir: Option<PathBuf>,
    },

    /// Bundle component entry points and serve them over HTTP
    Host {
        /// Entry points (defaults to the components listed in ssrkit.json)
        entries: Vec<PathBuf>,

        /// Address to bind (e.g. 127.0.0.1:4100)
        #[arg(long)]
        addr: Option<String>,

        /// URL prefix for the bundles
        #[arg(long, value_name = "PATH")]
        mount: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Build { entries, outdir }) => {
            let span = tracing::info_span!("build", cmd = "build", cwd = %cwd.display());
            let _guard = span.enter();
            let outdir = outdir.map(|dir| if dir.is_absolute() { dir } else { cwd.join(dir) });
            commands::build::run(
                commands::build::BuildAction {
                    cwd: config.cwd.clone(),
                    entries,
                    outdir,
                },
                cli.json,
            )
        }
        Some(Commands::Host {
            entries,
            addr,
            mount,
        }) => {
            let action = commands::host::HostAction {
                cwd: config.cwd.clone(),
                entries,
                addr,
                mount,
            };
            let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
            runtime.block_on(commands::host::run(action))
        }
    }
}
