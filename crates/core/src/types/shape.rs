use serde::Serialize;

use super::TypeDescriptor;

/// How a trait method borrows the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Receiver {
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
}

impl Receiver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Receiver::Ref => "&self",
            Receiver::RefMut => "&mut self",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyMember {
    pub name: String,
    pub ty: TypeDescriptor,
    pub mutable: bool,
    /// Qualified name of the trait declaring the accessors
    pub owner: String,
}

impl PropertyMember {
    pub fn getter_name(&self) -> String {
        format!("get_{}", self.name)
    }

    pub fn setter_name(&self) -> String {
        format!("set_{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodMember {
    pub name: String,
    pub receiver: Receiver,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeDescriptor,
    /// Qualified name of the trait declaring the method
    pub owner: String,
}

/// Flattened member set of a trait and all of its supertraits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceShape {
    pub qualified_name: String,
    /// The trait itself followed by every supertrait, in visit order
    pub traits: Vec<String>,
    pub properties: Vec<PropertyMember>,
    pub methods: Vec<MethodMember>,
}

impl InterfaceShape {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            traits: vec![qualified_name.clone()],
            qualified_name,
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMember> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodMember> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Last `::` segment of a path
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name.rsplit("::").next().unwrap_or(qualified_name)
}
