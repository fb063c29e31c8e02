use std::collections::HashMap;
use std::fmt;

use super::datatype::Symbol;
use super::scope::ScopeId;

/// A single scope: one name→symbol mapping plus its position in the
/// scope tree. `parent` is walked by lookup; `last` is the scope that
/// becomes current again when this one closes. The two differ when a
/// subclass body reopens its superclass's scope as parent while the
/// program scope stays the one to return to.
#[derive(Debug, Clone)]
pub struct SymScope {
    parent: Option<ScopeId>,
    last: Option<ScopeId>,
    children: Vec<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

impl SymScope {
    fn new(parent: Option<ScopeId>, last: Option<ScopeId>) -> Self {
        SymScope {
            parent,
            last,
            children: vec![],
            symbols: HashMap::new(),
        }
    }

    /// Get symbol in this scope only, no parent walk.
    fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// SymTab is the scope tree of a compilation. Scopes are arena nodes
/// addressed by ScopeId so that parent and last links are plain integer
/// handles. Open and close follow strict stack discipline through the
/// `last` links; `lookup` and `exists` search the current scope and all
/// parents, while `insert` considers only the current scope.
#[derive(Debug, Clone)]
pub struct SymTab {
    scopes: Vec<SymScope>,
    current: ScopeId,
}

impl SymTab {
    /// Create a symbol table holding only the root global scope.
    pub fn new() -> Self {
        SymTab {
            scopes: vec![SymScope::new(None, None)],
            current: ScopeId::global(),
        }
    }

    /// Open a fresh scope as a child of the current scope and make it
    /// current.
    pub fn open_scope(&mut self) -> ScopeId {
        let current = self.current;
        self.open_scope_at(current)
    }

    /// Open a fresh scope whose parent is `parent` (so its bindings are
    /// visible) but whose close restores the caller's current scope.
    /// Used when entering a subclass body to inherit the superclass's
    /// names.
    pub fn open_scope_at(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes
            .push(SymScope::new(Some(parent), Some(self.current)));
        self.scopes[parent.index()].children.push(id);
        self.current = id;
        id
    }

    /// Close the current scope, restoring the scope that was current when
    /// it was opened. Panics when called on the root scope; the passes
    /// keep open/close strictly balanced.
    pub fn close_scope(&mut self) {
        let last = self.scopes[self.current.index()]
            .last
            .expect("close_scope called on the root scope");
        self.current = last;
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Add a symbol to the current scope.
    /// @return true if successful, false if the name already exists in
    /// the current scope
    pub fn insert(&mut self, name: &str, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[self.current.index()];
        if scope.symbols.contains_key(name) {
            return false;
        }
        scope.symbols.insert(name.to_string(), symbol);
        true
    }

    /// Overwrite a symbol in the given scope. The name must already be
    /// present there; used to complete a method signature that was
    /// inserted as a placeholder before its parameter types were known.
    pub fn update_at(&mut self, scope: ScopeId, name: &str, symbol: Symbol) {
        let scope = &mut self.scopes[scope.index()];
        debug_assert!(scope.symbols.contains_key(name));
        scope.symbols.insert(name.to_string(), symbol);
    }

    /// Find a symbol in the current scope or any parent scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.lookup_from(self.current, name)
    }

    /// Find a symbol walking the parent chain upward from `scope`.
    pub fn lookup_from(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.get_symbol(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Probe a single scope without walking parents. Method dispatch uses
    /// this to find the defining class along a superclass chain.
    pub fn exists_local_in(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.index()].get_symbol(name).is_some()
    }
}

/// Formatting of the scope tree allows the symbol table to be dumped as an
/// indented string for debugging.
impl fmt::Display for SymTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn print_scope(
            table: &SymTab,
            f: &mut fmt::Formatter<'_>,
            id: ScopeId,
            depth: usize,
        ) -> fmt::Result {
            let indent = "\t".repeat(depth);
            let indent_plus = "\t".repeat(depth + 1);

            writeln!(f, "{}+-- Symbol Scope ---", indent)?;
            let scope = &table.scopes[id.index()];
            let mut names: Vec<&String> = scope.symbols.keys().collect();
            names.sort();
            for name in names {
                let symbol = &scope.symbols[name];
                writeln!(f, "{}| {} : {}", indent_plus, name, symbol.base_type)?;
            }
            for child in &scope.children {
                print_scope(table, f, *child, depth + 1)?;
            }
            Ok(())
        }

        print_scope(self, f, ScopeId::global(), 0)
    }
}

/// SymTab Module Tests
#[cfg(test)]
mod tests {
    use super::SymTab;
    use crate::compiler::ast::datatype::{BaseType, Symbol};

    fn integer_symbol() -> Symbol {
        Symbol::primitive(BaseType::Integer)
    }

    #[test]
    fn test_insert_and_lookup_current_scope() {
        let mut symtab = SymTab::new();
        assert!(symtab.insert("x", integer_symbol()));
        assert!(symtab.exists("x"));
        assert_eq!(symtab.lookup("x").unwrap().base_type, BaseType::Integer);
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let mut symtab = SymTab::new();
        assert!(symtab.insert("x", integer_symbol()));
        assert!(!symtab.insert("x", integer_symbol()));
    }

    #[test]
    fn test_lookup_walks_parent_scopes() {
        let mut symtab = SymTab::new();
        symtab.insert("outer", integer_symbol());
        symtab.open_scope();
        symtab.insert("inner", integer_symbol());
        assert!(symtab.exists("outer"));
        assert!(symtab.exists("inner"));

        symtab.close_scope();
        assert!(symtab.exists("outer"));
        assert!(!symtab.exists("inner"));
    }

    #[test]
    fn test_same_name_allowed_in_nested_scope() {
        let mut symtab = SymTab::new();
        assert!(symtab.insert("x", integer_symbol()));
        symtab.open_scope();
        assert!(symtab.insert("x", Symbol::primitive(BaseType::Boolean)));
        assert_eq!(symtab.lookup("x").unwrap().base_type, BaseType::Boolean);
        symtab.close_scope();
        assert_eq!(symtab.lookup("x").unwrap().base_type, BaseType::Integer);
    }

    #[test]
    fn test_open_scope_at_inherits_and_restores() {
        // Models a subclass body: parent is the superclass scope while
        // close returns to the program scope the caller was in.
        let mut symtab = SymTab::new();
        let superclass_scope = symtab.open_scope();
        symtab.insert("field", integer_symbol());
        symtab.close_scope();

        let program_scope = symtab.current_scope();
        let subclass_scope = symtab.open_scope_at(superclass_scope);
        assert!(symtab.exists("field"));
        assert_ne!(subclass_scope, superclass_scope);

        symtab.close_scope();
        assert_eq!(symtab.current_scope(), program_scope);
        assert!(!symtab.exists("field"));
    }

    #[test]
    fn test_exists_local_in_does_not_walk_parents() {
        let mut symtab = SymTab::new();
        symtab.insert("outer", integer_symbol());
        let inner = symtab.open_scope();
        symtab.insert("inner", integer_symbol());

        assert!(symtab.exists_local_in(inner, "inner"));
        assert!(!symtab.exists_local_in(inner, "outer"));
    }
}
