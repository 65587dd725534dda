//! Command-line interface for the Helio compiler.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Helio - a small statically typed scripting language that compiles to
/// Python or C++
#[derive(Parser)]
#[command(name = "helio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Helio source file (`.hl`). Without it, source is read from stdin
    /// until a line reading `END`.
    pub file: Option<PathBuf>,

    /// Target backend. Without it, the driver prompts interactively.
    #[arg(short, long, value_enum)]
    pub target: Option<Target>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the front-end only and report diagnostics
    Check {
        /// Path to the Helio file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Emit and run `output.py`
    Py,
    /// Emit, compile, and run `output.cpp`
    Cpp,
}

impl Cli {
    pub fn resolve_command(&self) -> ResolvedCommand {
        match &self.command {
            Some(Commands::Check { file }) => ResolvedCommand::Check { file: file.clone() },
            None => ResolvedCommand::Build {
                file: self.file.clone(),
                target: self.target,
            },
        }
    }
}

/// Resolved command after processing CLI arguments.
pub enum ResolvedCommand {
    Build {
        file: Option<PathBuf>,
        target: Option<Target>,
    },
    Check {
        file: PathBuf,
    },
}
