/// Scope Id is the stable handle of a scope node in the symbol table
/// arena. Handles stay valid for the whole compilation; scopes are never
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    id: usize,
}

impl ScopeId {
    /// Handle of the root (global) scope.
    pub fn global() -> Self {
        ScopeId { id: 0 }
    }

    pub(super) fn new(id: usize) -> Self {
        ScopeId { id }
    }

    pub(super) fn index(&self) -> usize {
        self.id
    }
}
