use std::collections::HashMap;

use super::offset_table::OffsetTable;
use super::scope::ScopeId;

/// One entry of the class table: the class name, its superclass name when
/// declared with one, the scope holding its fields and methods, and the
/// heap layout of its fields. The offset table is filled by the code
/// generator; everything else by the type checker.
#[derive(Debug, Clone)]
pub struct ClassNode {
    pub name: String,
    pub super_class: Option<String>,
    pub scope: ScopeId,
    pub offset: OffsetTable,
}

/// ClassTable is the flat name→class mapping of a compilation. Class
/// names are unique and a superclass must already be present when a
/// subclass is inserted. `parent_of` hands back a sentinel top class for
/// classes without a declared superclass.
#[derive(Debug, Clone)]
pub struct ClassTable {
    classes: HashMap<String, ClassNode>,
    top_class: ClassNode,
}

impl ClassTable {
    pub fn new() -> Self {
        ClassTable {
            classes: HashMap::new(),
            top_class: ClassNode {
                name: String::from("TopClass"),
                super_class: None,
                scope: ScopeId::global(),
                offset: OffsetTable::new(),
            },
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Record a new class. The caller has already verified that the name
    /// is fresh and that the superclass, when given, exists; violations
    /// are compiler bugs.
    pub fn insert(&mut self, name: &str, super_class: Option<&str>, scope: ScopeId) {
        if let Some(super_name) = super_class {
            assert!(
                self.exists(super_name),
                "superclass {} inserted after subclass {}",
                super_name,
                name
            );
        }
        self.classes.insert(
            name.to_string(),
            ClassNode {
                name: name.to_string(),
                super_class: super_class.map(String::from),
                scope,
                offset: OffsetTable::new(),
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&ClassNode> {
        self.classes.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut ClassNode> {
        self.classes.get_mut(name)
    }

    /// The class's superclass record, or the sentinel top class when it
    /// has no declared superclass.
    pub fn parent_of(&self, name: &str) -> Option<&ClassNode> {
        let node = self.lookup(name)?;
        match &node.super_class {
            Some(super_name) => self.lookup(super_name),
            None => Some(&self.top_class),
        }
    }
}

/// ClassTable Module Tests
#[cfg(test)]
mod tests {
    use super::ClassTable;
    use crate::compiler::ast::scope::ScopeId;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = ClassTable::new();
        table.insert("A", None, ScopeId::global());
        table.insert("B", Some("A"), ScopeId::global());

        assert!(table.exists("A"));
        assert!(table.exists("B"));
        assert!(!table.exists("C"));
        assert_eq!(table.lookup("B").unwrap().super_class.as_deref(), Some("A"));
    }

    #[test]
    fn test_parent_of_walks_to_superclass() {
        let mut table = ClassTable::new();
        table.insert("A", None, ScopeId::global());
        table.insert("B", Some("A"), ScopeId::global());

        assert_eq!(table.parent_of("B").unwrap().name, "A");
    }

    #[test]
    fn test_parent_of_root_class_is_sentinel() {
        let mut table = ClassTable::new();
        table.insert("A", None, ScopeId::global());

        assert_eq!(table.parent_of("A").unwrap().name, "TopClass");
        assert!(table.parent_of("Missing").is_none());
    }
}
