mod type_error;
pub mod minnow_type_checker;

use super::ast::{ASTNode, AbstractSyntaxTree};

pub use self::type_error::TypeError;

/// SemanticAnalyser takes a parsed AST root, validates the program
/// semantics and hands back the tree decorated with types together with
/// the symbol and class tables built during the walk. Compilation halts
/// on the first semantic error.
pub trait SemanticAnalyser {
    /// Creates a default configuration of a SemanticAnalyser
    fn default() -> Self;

    /// Type check an Abstract Syntax Tree, decorating it in place
    fn analyse(self, root: ASTNode) -> Result<AbstractSyntaxTree, TypeError>;
}

// Concrete Definition Export
pub use self::minnow_type_checker::MinnowTypeChecker;
