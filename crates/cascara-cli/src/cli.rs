//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cascara")]
#[command(about = "Cascara CSS preprocessor", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a stylesheet to flat CSS.
    Build {
        /// Input stylesheet path.
        input: PathBuf,

        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recompile whenever the input changes.
        #[cfg(feature = "watch")]
        #[arg(long)]
        watch: bool,
    },
    /// Parse a stylesheet and report problems without emitting CSS.
    Check {
        /// Input stylesheet path.
        input: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_accepts_output_flag() {
        let cli = Cli::parse_from(["cascara", "build", "in.ccss", "-o", "out.css"]);

        match cli.command {
            Commands::Build { input, output, .. } => {
                assert_eq!(input, PathBuf::from("in.ccss"));
                assert_eq!(output, Some(PathBuf::from("out.css")));
            }
            other => panic!("expected build command, got {other:?}"),
        }
    }
}
