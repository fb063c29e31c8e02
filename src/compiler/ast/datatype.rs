use strum_macros::Display;

/// Base types supported by the AST model.
/// Undef marks a node the type checker has not reached yet; no expression
/// node keeps it after a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BaseType {
    Undef,
    Integer,
    Boolean,
    Function,
    Object,
    Nothing,
}

/// A base type together with the class name it refers to.
/// The class id is only meaningful when the base type is Object (or when
/// carried as a method return type that is an Object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundType {
    pub base_type: BaseType,
    pub class_id: String,
}

impl CompoundType {
    pub fn undef() -> Self {
        CompoundType {
            base_type: BaseType::Undef,
            class_id: String::new(),
        }
    }

    pub fn primitive(base_type: BaseType) -> Self {
        CompoundType {
            base_type,
            class_id: String::new(),
        }
    }

    pub fn object(class_id: String) -> Self {
        CompoundType {
            base_type: BaseType::Object,
            class_id,
        }
    }
}

/// Signature of a method: its return compound and one compound per
/// declared parameter, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodType {
    pub return_type: CompoundType,
    pub args_type: Vec<CompoundType>,
}

impl MethodType {
    pub fn undef() -> Self {
        MethodType {
            return_type: CompoundType::undef(),
            args_type: vec![],
        }
    }
}

/// DataType is the full decorated type record carried by node attributes
/// and by symbol table entries. The class type is populated for Object
/// values; the method type only for method symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub base_type: BaseType,
    pub class_type: CompoundType,
    pub method_type: MethodType,
}

impl DataType {
    pub fn undef() -> Self {
        DataType {
            base_type: BaseType::Undef,
            class_type: CompoundType::undef(),
            method_type: MethodType::undef(),
        }
    }

    pub fn primitive(base_type: BaseType) -> Self {
        DataType {
            base_type,
            class_type: CompoundType::primitive(base_type),
            method_type: MethodType::undef(),
        }
    }

    pub fn object(class_id: String) -> Self {
        DataType {
            base_type: BaseType::Object,
            class_type: CompoundType::object(class_id),
            method_type: MethodType::undef(),
        }
    }

    pub fn function(method_type: MethodType) -> Self {
        DataType {
            base_type: BaseType::Function,
            class_type: CompoundType::undef(),
            method_type,
        }
    }
}

/// Symbol table entries are value types identical to the decorated type
/// record, so a lookup hands back everything later passes need.
pub type Symbol = DataType;
