use super::datatype::DataType;
use super::scope::ScopeId;

/// Attribute is the per-node decoration slot shared by every AST node.
/// The parser fills in the source line, the type checker fills in the
/// inferred type (and the owning scope for definition nodes), and the
/// code generator only reads.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub lineno: u32,
    pub datatype: DataType,
    pub scope: Option<ScopeId>,
}

impl Attribute {
    pub fn new(lineno: u32) -> Self {
        Attribute {
            lineno,
            datatype: DataType::undef(),
            scope: None,
        }
    }
}
