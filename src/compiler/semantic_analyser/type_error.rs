use thiserror::Error;

/// The closed set of semantic errors. Each variant carries the source
/// line of the node under check when the rule failed; rendering matches
/// the diagnostic contract `on line number N, error: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("on line number {0}, error: no Program class")]
    NoProgram(u32),

    #[error("on line number {0}, error: no start function in Program class")]
    NoStart(u32),

    #[error("on line number {0}, error: start function has arguments")]
    StartArgs(u32),

    #[error("on line number {0}, error: duplicate identifier name in same scope")]
    DuplicateIdentifier(u32),

    #[error("on line number {0}, error: symbol by name undefined")]
    SymbolUndefined(u32),

    #[error("on line number {0}, error: symbol by name defined, but of unexpected type")]
    SymbolTypeMismatch(u32),

    #[error("on line number {0}, error: function call has different number of args than the declaration")]
    CallArgCountMismatch(u32),

    #[error("on line number {0}, error: type mismatch in function call args")]
    CallArgsMismatch(u32),

    #[error("on line number {0}, error: type mismatch in return statement")]
    ReturnTypeMismatch(u32),

    #[error("on line number {0}, error: types of right and left hand side do not match in assignment")]
    IncompatibleAssignment(u32),

    #[error("on line number {0}, error: predicate of if statement is not boolean")]
    IfPredicate(u32),

    #[error("on line number {0}, error: incompatible types used in expression")]
    ExpressionType(u32),

    #[error("on line number {0}, error: function doesn't exist in object")]
    NoClassMethod(u32),
}
