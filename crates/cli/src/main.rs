mod cli;
mod pipeline;

use clap::Parser;
use cli::{Cli, ResolvedCommand};
use pipeline::{build, check};
use std::process;

fn main() {
    let cli = Cli::parse();

    let result = match cli.resolve_command() {
        ResolvedCommand::Build { file, target } => build(file.as_deref(), target),
        ResolvedCommand::Check { file } => check(&file),
    };

    if let Err(error) = result {
        let message = error.to_string();
        if !message.is_empty() {
            eprintln!("{message}");
        }
        process::exit(1);
    }
}
