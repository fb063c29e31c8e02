pub(super) mod ast_node;
pub(super) mod attribute;
pub(super) mod class_table;
pub(super) mod datatype;
pub(super) mod literals;
pub(super) mod operators;
pub(super) mod scope;
pub(super) mod symbol_table;
pub(super) mod offset_table;

pub(super) use self::{
    ast_node::{ASTNode, NodeKind, TypeAnnotation},
    literals::Literal,
    operators::{BinaryOperation, UnaryOperation},
};

use self::class_table::ClassTable;
use self::symbol_table::SymTab;

/// Intermediate representation of the compiler model after type checking.
/// The tree root is decorated with types, and the auxiliary tables built
/// during the check (the scope tree and the class hierarchy) travel with
/// it into the backend.
pub struct AbstractSyntaxTree {
    root: ASTNode,
    symbol_table: SymTab,
    class_table: ClassTable,
}

impl AbstractSyntaxTree {
    pub(super) fn new(root: ASTNode, symbol_table: SymTab, class_table: ClassTable) -> Self {
        Self {
            root,
            symbol_table,
            class_table,
        }
    }

    pub fn root(&self) -> &ASTNode {
        &self.root
    }

    pub fn symbol_table(&self) -> &SymTab {
        &self.symbol_table
    }

    pub fn class_table(&self) -> &ClassTable {
        &self.class_table
    }

    /// Break the tree apart for the backend.
    pub(super) fn into_parts(self) -> (ASTNode, SymTab, ClassTable) {
        (self.root, self.symbol_table, self.class_table)
    }
}
