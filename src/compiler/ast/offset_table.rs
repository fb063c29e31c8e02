use std::collections::HashMap;

use super::datatype::CompoundType;

/// Layout record of one identifier: its byte offset, its size and the
/// compound type it was declared with. Field offsets are non-negative
/// from the object base; method-local offsets are negative from the
/// frame pointer; parameter offsets start at +12.
#[derive(Debug, Clone)]
pub struct OffsetEntry {
    pub offset: i32,
    pub size: i32,
    pub decl_type: CompoundType,
}

/// OffsetTable maps identifiers to layout records for one class (heap
/// fields) or one method (locals and parameters). A subclass's table is
/// seeded by cloning its superclass's so inherited fields keep their
/// offsets and the new fields append after them.
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    entries: HashMap<String, OffsetEntry>,
    total_size: i32,
    param_size: i32,
}

impl OffsetTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, name: &str, offset: i32, size: i32, decl_type: CompoundType) {
        self.entries.insert(
            name.to_string(),
            OffsetEntry {
                offset,
                size,
                decl_type,
            },
        );
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&OffsetEntry> {
        self.entries.get(name)
    }

    pub fn total_size(&self) -> i32 {
        self.total_size
    }

    pub fn set_total_size(&mut self, size: i32) {
        self.total_size = size;
    }

    pub fn param_size(&self) -> i32 {
        self.param_size
    }

    pub fn set_param_size(&mut self, size: i32) {
        self.param_size = size;
    }
}
