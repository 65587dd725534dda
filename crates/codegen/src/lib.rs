//! Code generation backends for the Helio compiler.
//!
//! Both backends are syntax-directed walks over the analyzer-annotated tree:
//! every expression node carries a resolved type, every function an explicit
//! return type, `Math` arrives as a plain identifier, and the endloop/next
//! statements mean break/continue. No further analysis happens here.

pub mod cpp;
pub mod python;

pub use cpp::CppBackend;
pub use python::PythonBackend;

use helio_parser::parser::ast::Program;

/// A target backend producing source text for an equivalent program.
pub trait Backend {
    fn generate(&mut self, program: &Program) -> String;

    /// Name of the file the driver writes the emitted program to.
    fn output_file(&self) -> &'static str;
}
