// External Modules
extern crate pest;
#[macro_use]
extern crate pest_derive;

// Internal Modules
mod compiler;

// Concrete Definitions Re-Export
pub use compiler::backend::{BackEndGenerator, X86AssemblyGenerator};
pub use compiler::parser::{AstParser, ParseError, PestMinnowParser};
pub use compiler::semantic_analyser::{MinnowTypeChecker, SemanticAnalyser, TypeError};
pub use compiler::{CompileError, Compiler};

/// Compiles a string of Minnow source into x86 assembly text using the
/// default compiler configuration.
pub fn compile_str(source: &str) -> Result<String, CompileError> {
    let compiler: Compiler<PestMinnowParser, MinnowTypeChecker, X86AssemblyGenerator> =
        Compiler::default();
    compiler.compile_str(source)
}
