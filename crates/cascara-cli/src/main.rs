//! Cascara command-line compiler.

mod cli;
#[cfg(feature = "watch")]
mod watch;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use cascara_core::pipeline::Pipeline;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        #[cfg(feature = "watch")]
        Commands::Build {
            input,
            output,
            watch: true,
        } => watch::run(&Pipeline::new(), &input, output.as_deref()),

        #[cfg(feature = "watch")]
        Commands::Build {
            input,
            output,
            watch: false,
        } => build_once(&Pipeline::new(), &input, output.as_deref()),

        #[cfg(not(feature = "watch"))]
        Commands::Build { input, output } => {
            build_once(&Pipeline::new(), &input, output.as_deref())
        }

        Commands::Check { input } => {
            let source =
                fs::read_to_string(&input).map_err(|e| cascara_core::Error::io(&input, e))?;
            let tree = cascara_core::parser::parse(&source)?;
            println!("ok: {} ({} top-level blocks)", input.display(), tree.len());
            Ok(())
        }
    }
}

/// Compile one file to its destination (stdout when none is given).
pub(crate) fn build_once(
    pipeline: &Pipeline,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let css = pipeline.process_file(input)?;
    match output {
        Some(path) => fs::write(path, format!("{css}\n"))?,
        None => println!("{css}"),
    }
    Ok(())
}
