use serde::Serialize;

use super::TypeDescriptor;

/// One forwardable call: the shape that crosses the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodCallDescriptor {
    pub name: String,
    pub argument_types: Vec<TypeDescriptor>,
    pub result_type: TypeDescriptor,
}

impl MethodCallDescriptor {
    /// Descriptor of a property read: `get` + capitalized property name.
    pub fn getter(property: &str, ty: &TypeDescriptor) -> Self {
        Self {
            name: format!("get{}", capitalize(property)),
            argument_types: Vec::new(),
            result_type: ty.clone(),
        }
    }

    /// Descriptor of a property write: `set` + capitalized property name.
    pub fn setter(property: &str, ty: &TypeDescriptor) -> Self {
        Self {
            name: format!("set{}", capitalize(property)),
            argument_types: vec![ty.clone()],
            result_type: TypeDescriptor::unit(),
        }
    }

    pub fn method(name: &str, argument_types: Vec<TypeDescriptor>, result_type: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            argument_types,
            result_type,
        }
    }
}

/// Upper-cases the first character only. Characters whose uppercase form
/// expands (`ß` -> `SS`) keep the full expansion.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
