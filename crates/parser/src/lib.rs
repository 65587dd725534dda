//! Helio language front-end: lexer, parser, and semantic analyzer.
//!
//! The pipeline is three stages over owned data:
//!
//! 1. [`Lexer`] turns source text into a token stream ending in `Eof`,
//!    collecting lexical diagnostics without ever failing.
//! 2. [`Parser`] builds a [`parser::ast::Program`], recovering at statement
//!    boundaries; it returns a tree only when no syntax error was recorded.
//! 3. [`Analyzer`] runs two passes over the tree, annotating every
//!    expression with its resolved [`Type`] and collecting semantic
//!    diagnostics.
//!
//! ```
//! use helio_parser::{Analyzer, Lexer, Parser};
//!
//! let source = "int x = 1 + 2; print(x);";
//! let mut lexer = Lexer::new(source);
//! let tokens = lexer.tokenize();
//! assert!(lexer.errors().is_empty());
//!
//! let mut parser = Parser::new(tokens);
//! let mut program = parser.parse().expect("parses cleanly");
//!
//! let mut analyzer = Analyzer::new();
//! analyzer.analyze(&mut program).expect("analyzes cleanly");
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod types;

pub use error::{HelioError, LexError, ParseError, SemanticError};
pub use lexer::token::{Token, TokenKind};
pub use lexer::Lexer;
pub use parser::Parser;
pub use semantic::Analyzer;
pub use types::Type;
