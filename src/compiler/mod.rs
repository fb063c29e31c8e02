mod ast;
pub mod backend;
pub mod parser;
pub mod semantic_analyser;

#[cfg(test)]
mod test;

use std::fs;
use std::path::Path;

use thiserror::Error;

// Interface Definitions
use self::backend::BackEndGenerator;
use self::parser::AstParser;
use self::semantic_analyser::SemanticAnalyser;

// Concrete Definitions Re-Export
pub use self::backend::X86AssemblyGenerator;
pub use self::parser::{ParseError, PestMinnowParser};
pub use self::semantic_analyser::{MinnowTypeChecker, TypeError};

/// CompileError aggregates the failure modes of a compilation: a syntax
/// error from the parser, a semantic error from the type checker, or an
/// I/O failure reading the source. Semantic errors halt the pipeline
/// before code generation starts.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Syntax(#[from] ParseError),

    #[error("{0}")]
    Semantic(#[from] TypeError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Compiler is a simple class that holds the configuration of a
/// compilation. Compiler takes three typed parameters defining:
///  the AstParser being used,
///  the SemanticAnalyser being used,
///  and the BackEndGenerator being used.
///
/// # Compilation Diagram
/// minnow_code -> AstParser -> AbstractSyntaxTree -> SemanticAnalyser -> Decorated AbstractSyntaxTree -> BackEndGenerator -> x86 assembly text
pub struct Compiler<P: AstParser, A: SemanticAnalyser, G: BackEndGenerator> {
    parser: P,
    analyser: A,
    generator: G,
    dump_symbols: bool,
}

#[allow(dead_code)] // Many of the functions on compiler act as a library interface and are not used
impl<P: AstParser, A: SemanticAnalyser, G: BackEndGenerator> Compiler<P, A, G> {
    /// Default generates a default compiler configuration. Default
    /// configuration is determined by the default methods of the parser,
    /// analyser and generator.
    pub fn default() -> Self {
        Compiler {
            parser: P::default(),
            analyser: A::default(),
            generator: G::default(),
            dump_symbols: false,
        }
    }

    /// Create new compiler using preconfigured passes.
    pub fn new(parser: P, analyser: A, generator: G) -> Self {
        Compiler {
            parser,
            analyser,
            generator,
            dump_symbols: false,
        }
    }

    /// Enable dumping the symbol table to stderr after type checking.
    pub fn set_symbol_dump(mut self, enabled: bool) -> Self {
        self.dump_symbols = enabled;
        self
    }

    /// Compiles a string of Minnow source into assembly text.
    pub fn compile_str(self, source: &str) -> Result<String, CompileError> {
        let root = self.parser.parse(source)?;
        let tree = self.analyser.analyse(root)?;

        if self.dump_symbols {
            eprint!("{}", tree.symbol_table());
        }

        Ok(self.generator.generate(tree))
    }

    /// Compiles a source file into assembly text.
    /// @return: assembly text if Ok. Otherwise the I/O error from a
    /// failed read or the compilation error.
    pub fn compile(self, source_filename: &Path) -> Result<String, CompileError> {
        let source_str = fs::read_to_string(source_filename)?;

        self.compile_str(source_str.as_str())
    }
}
