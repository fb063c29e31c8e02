mod assembly_builder;
mod x86_assembly_generator;

use super::ast::AbstractSyntaxTree;

// Abstract Definitions

/// BackEndGenerator takes a type-checked AbstractSyntaxTree and emits the
/// target program text.
pub trait BackEndGenerator {
    /// Generate default generator configuration
    fn default() -> Self;

    /// Generate assembly text from an abstract syntax tree
    fn generate(self, tree: AbstractSyntaxTree) -> String;
}

// Concrete Definition Export
pub use self::x86_assembly_generator::X86AssemblyGenerator;
