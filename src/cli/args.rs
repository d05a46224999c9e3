//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Use this project config instead of `metaconform.toml`
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::harness::StrictMode;

/// metaconform - conformance harness for versioned binary metadata
#[derive(Parser, Debug)]
#[command(name = "metaconform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if metaconform was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Project config file (defaults to metaconform.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the fixtures of a suite manifest
    #[command(
        name = "run",
        long_about = "Run the fixtures of a suite manifest.\n\n\
            Every fixture is decoded on its own registry and checked four ways: \
            byte-exact re-encoding, structural comparison with the stored golden \
            fixtures, conversion to the latest version, and decodability of every \
            storage default.\n\n\
            In reconcile mode, mismatching or missing golden fixtures are rewritten \
            and reported as warnings. In enforce mode they fail. Without --mode, the \
            configured mode is used, then the CI environment variable decides.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Run everything declared in the configured manifest
    metaconform run

    # Regenerate golden fixtures after an intentional codec change
    metaconform run --mode reconcile

    # One fixture, as CI would run it
    metaconform run --fixture polkadot-9110 --mode enforce

    # Machine-readable report
    metaconform run --json > report.json"
    )]
    Run {
        /// Suite manifest (overrides the configured one)
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Only run fixtures declared under this schema version
        #[arg(long = "schema-version", value_name = "N")]
        schema_version: Option<u32>,

        /// Only run the fixture with this name
        #[arg(long, value_name = "NAME")]
        fixture: Option<String>,

        /// Golden fixture policy
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a metadata blob and summarize it
    #[command(
        name = "inspect",
        long_about = "Decode a hex-encoded metadata blob and print its version, \
            module count and storage item count.\n\n\
            The file may contain a 0x prefix and whitespace."
    )]
    Inspect {
        /// File holding hex-encoded metadata
        #[arg(value_name = "HEX_FILE")]
        file: PathBuf,
    },

    /// List the storage locations of a metadata blob
    #[command(
        name = "locations",
        long_about = "List every storage location of a hex-encoded metadata blob, \
            one per line, in declaration order.\n\n\
            Locations have the form `module.item: Type` and are what exemption \
            entries match against.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Find the location string of a failing default
    metaconform locations kusama-1020.hex | grep staking"
    )]
    Locations {
        /// File holding hex-encoded metadata
        #[arg(value_name = "HEX_FILE")]
        file: PathBuf,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    metaconform completion bash > ~/.local/share/bash-completion/completions/metaconform

    # Zsh
    metaconform completion zsh > ~/.zfunc/_metaconform

    # Fish
    metaconform completion fish > ~/.config/fish/completions/metaconform.fish

    # PowerShell
    metaconform completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Golden fixture policy, as accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Enforce,
    Reconcile,
}

impl From<ModeArg> for StrictMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Enforce => StrictMode::Enforce,
            ModeArg::Reconcile => StrictMode::Reconcile,
        }
    }
}

/// Supported shells for completion.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
