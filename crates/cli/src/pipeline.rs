//! Pipeline for compiling Helio source.
//!
//! Reads source (file or stdin), runs the front-end, and on success hands
//! the annotated tree to the selected backend, writes the output file, and
//! attempts to run it. All diagnostics go to stderr; the library crates only
//! collect them.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use helio_codegen::{Backend, CppBackend, PythonBackend};
use helio_parser::parser::ast::Program;
use helio_parser::{Analyzer, HelioError, Lexer, Parser};

use crate::cli::Target;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Source(String),
    /// Diagnostics were already printed to stderr.
    #[error("")]
    Compile,
    #[error("{0}")]
    Tool(String),
}

/// Compile a file (or stdin when `file` is `None`), emit for `target`
/// (prompting when `None`), and run the result.
pub fn build(file: Option<&Path>, target: Option<Target>) -> PipelineResult<()> {
    let source = read_source(file)?;
    let program = front_end(&source)?;

    let target = match target {
        Some(target) => target,
        None => prompt_target()?,
    };

    let mut backend: Box<dyn Backend> = match target {
        Target::Py => Box::new(PythonBackend::new()),
        Target::Cpp => Box::new(CppBackend::new()),
    };

    let code = backend.generate(&program);
    let output_file = backend.output_file();
    std::fs::write(output_file, code)?;
    println!("Wrote {output_file}");

    run_output(target, output_file)
}

/// Run the front-end only and report the outcome.
pub fn check(file: &Path) -> PipelineResult<()> {
    let source = read_source(Some(file))?;
    front_end(&source)?;
    println!("{}: no errors", file.display());
    Ok(())
}

/// Lex, parse, and analyze, printing every diagnostic to stderr. Lexical
/// diagnostics do not fail the compilation on their own; any parse or
/// semantic diagnostic does.
fn front_end(source: &str) -> PipelineResult<Program> {
    match run_front_end(source) {
        Ok(program) => Ok(program),
        Err(error) => {
            eprintln!("{error}");
            Err(PipelineError::Compile)
        }
    }
}

fn run_front_end(source: &str) -> Result<Program, HelioError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    for error in lexer.errors() {
        eprintln!("{error}");
    }

    let mut parser = Parser::new(tokens);
    let Some(mut program) = parser.parse() else {
        return Err(HelioError::Parse(parser.errors().to_vec()));
    };

    let mut analyzer = Analyzer::new();
    analyzer
        .analyze(&mut program)
        .map_err(HelioError::Semantic)?;

    Ok(program)
}

fn read_source(file: Option<&Path>) -> PipelineResult<String> {
    match file {
        Some(path) => {
            if path.extension().and_then(|e| e.to_str()) != Some("hl") {
                return Err(PipelineError::Source(format!(
                    "Source file must have the `.hl` extension: {}",
                    path.display()
                )));
            }
            Ok(std::fs::read_to_string(path)?)
        }
        None => read_stdin_until_end(),
    }
}

/// Read stdin line by line until a line reading exactly `END`.
fn read_stdin_until_end() -> PipelineResult<String> {
    println!("Enter Helio source; finish with a line reading END");
    let stdin = io::stdin();
    let mut source = String::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line == "END" {
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }
    Ok(source)
}

fn prompt_target() -> PipelineResult<Target> {
    let stdin = io::stdin();
    loop {
        print!("Select a target backend (1 = Python, 2 = C++): ");
        io::stdout().flush()?;

        let mut choice = String::new();
        if stdin.lock().read_line(&mut choice)? == 0 {
            return Err(PipelineError::Source(
                "No backend selected".to_string(),
            ));
        }
        match choice.trim() {
            "1" => return Ok(Target::Py),
            "2" => return Ok(Target::Cpp),
            other => eprintln!("Unrecognized choice '{other}'; enter 1 or 2."),
        }
    }
}

/// Best-effort execution of the emitted program, forwarding its stdio.
fn run_output(target: Target, output_file: &str) -> PipelineResult<()> {
    match target {
        Target::Py => {
            let status = Command::new("python3").arg(output_file).status()?;
            if !status.success() {
                return Err(PipelineError::Tool(format!(
                    "python3 exited with {status}"
                )));
            }
        }
        Target::Cpp => {
            let status = Command::new("g++")
                .args([output_file, "-o", "output"])
                .status()?;
            if !status.success() {
                return Err(PipelineError::Tool(format!("g++ exited with {status}")));
            }
            let status = Command::new("./output").status()?;
            if !status.success() {
                return Err(PipelineError::Tool(format!(
                    "emitted program exited with {status}"
                )));
            }
        }
    }
    Ok(())
}
