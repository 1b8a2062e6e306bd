use serde::Serialize;
use std::fmt;

/// Qualified name used for the unit sentinel (`()`)
pub const UNIT: &str = "()";

const OPTION: &str = "std::option::Option";

/// Normalized description of a resolved type.
///
/// Two descriptors are equal iff their qualified names, generic arguments
/// (element-wise, in order) and nullability all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeDescriptor>,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            generic_arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn unit() -> Self {
        Self::new(UNIT)
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeDescriptor>) -> Self {
        self.generic_arguments = arguments;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_unit(&self) -> bool {
        self.qualified_name == UNIT && !self.nullable
    }

    /// Runtime type tag: the base qualified name, without generic arguments
    /// or nullability.
    pub fn type_tag(&self) -> &str {
        &self.qualified_name
    }

    /// Rust source syntax for this type.
    pub fn render(&self) -> String {
        let mut base = self.qualified_name.clone();
        if !self.generic_arguments.is_empty() {
            let arguments: Vec<String> = self.generic_arguments.iter().map(|a| a.render()).collect();
            base.push('<');
            base.push_str(&arguments.join(", "));
            base.push('>');
        }
        if self.nullable {
            format!("{OPTION}<{base}>")
        } else {
            base
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
