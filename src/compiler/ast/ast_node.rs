use super::attribute::Attribute;
use super::literals::Literal;
use super::operators::{BinaryOperation, UnaryOperation};

/// Type annotations as they appear in declarations, parameters and
/// method return positions.
///
/// # Example:
///     var b : B;
///             ^ -> T_OBJECT("B")
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TypeAnnotation {
    T_INTEGER,
    T_BOOLEAN,
    T_NOTHING,
    T_OBJECT(String),
}

/// An AST node couples a syntactic form with its decoration attribute.
/// The parser creates nodes with only the source line filled in; the type
/// checker mutates the attribute in place.
#[derive(Debug, Clone)]
pub struct ASTNode {
    pub kind: NodeKind,
    pub attribute: Attribute,
}

impl ASTNode {
    pub fn new(kind: NodeKind, lineno: u32) -> Self {
        ASTNode {
            kind,
            attribute: Attribute::new(lineno),
        }
    }

    /// Utility function for simplifying extracting the string out of an
    /// identifier leaf node
    pub(crate) fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::CLASS_ID(name)
            | NodeKind::VARIABLE_ID(name)
            | NodeKind::METHOD_ID(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
#[allow(non_camel_case_types)]
pub enum NodeKind {
    /// Root of the tree, an ordered sequence of class definitions.
    PROGRAM(Vec<ASTNode>),

    /// Class definition with an optional superclass.
    ///
    /// # Example:
    ///     class B : A { ... }
    ///           ^   ^ -> class_id, super_class_id
    CLASS {
        class_id: Box<ASTNode>,
        super_class_id: Option<Box<ASTNode>>,
        declarations: Vec<ASTNode>,
        methods: Vec<ASTNode>,
    },

    /// Variable declaration, one type annotation shared by one or more
    /// variable names.
    ///
    /// # Example:
    ///     var x, y : Integer;
    ///     ^^^^^^^^^^^^^^^^^^^ -> Declaration
    DECLARATION {
        datatype: Box<ASTNode>,
        variable_ids: Vec<ASTNode>,
    },

    /// Method definition.
    ///
    /// # Example:
    ///     f(a : Integer) -> Boolean { ... }
    ///     ^ -> method_id
    METHOD {
        method_id: Box<ASTNode>,
        parameters: Vec<ASTNode>,
        return_type: Box<ASTNode>,
        body: Box<ASTNode>,
    },

    /// Method body: local declarations, statements, then the mandatory
    /// return.
    METHOD_BODY {
        declarations: Vec<ASTNode>,
        statements: Vec<ASTNode>,
        ret: Box<ASTNode>,
    },

    /// Formal parameter of a method definition.
    PARAMETER {
        variable_id: Box<ASTNode>,
        datatype: Box<ASTNode>,
    },

    /// Assignment statement to a local, parameter or field.
    ///
    /// # Example:
    ///     x = y + 1;
    ///     ^^^^^^^^^^ -> Assignment
    ASSIGNMENT {
        variable_id: Box<ASTNode>,
        expression: Box<ASTNode>,
    },

    /// Conditional statement. The predicate must be Boolean; there is no
    /// else branch in the language.
    ///
    /// # Example:
    ///     if (x < 10) Print(x);
    IF {
        condition: Box<ASTNode>,
        body: Box<ASTNode>,
    },

    /// Print statement, lowered to a call of the emitted Print shim.
    ///
    /// # Example:
    ///     Print(42);
    PRINT {
        expression: Box<ASTNode>,
    },

    /// Return with an optional expression; `return;` has type Nothing.
    RETURN {
        expression: Option<Box<ASTNode>>,
    },

    /// Type annotation position.
    DATATYPE(TypeAnnotation),

    /// Binary operation is an expression operation with two arguments.
    ///
    /// # Syntax:
    ///     <lhs> <op> <rhs>
    BINARY_OP {
        op: BinaryOperation,
        lhs: Box<ASTNode>,
        rhs: Box<ASTNode>,
    },

    /// Unary operation is an expression operation with only one argument.
    ///
    /// # Example:
    ///     x = -(y);
    ///         ^ -> Unary Operator
    UNARY_OP {
        op: UnaryOperation,
        expression: Box<ASTNode>,
    },

    /// Call of a method on a named receiver variable.
    ///
    /// # Example:
    ///     b.f(1, 2)
    ///     ^ ^ -> variable_id, method_id
    METHOD_CALL {
        variable_id: Box<ASTNode>,
        method_id: Box<ASTNode>,
        arguments: Vec<ASTNode>,
    },

    /// Call of a method on the current receiver.
    ///
    /// # Example:
    ///     f(1, 2)
    SELF_CALL {
        method_id: Box<ASTNode>,
        arguments: Vec<ASTNode>,
    },

    /// Variable reference in expression position.
    VARIABLE {
        variable_id: Box<ASTNode>,
    },

    /// Literal is a constant value used within an expression.
    LITERAL(Literal),

    /// The absent value; only valid in return position of a Nothing
    /// method.
    NOTHING,

    // Identifier leaves. These carry no type of their own; the checker
    // resolves them in the context of the parent node.
    CLASS_ID(String),
    VARIABLE_ID(String),
    METHOD_ID(String),
}
