use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Index of a declaration in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub usize);

/// Index of a module scope in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub usize);

/// Unresolved type syntax as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    /// `Vec<i32>`, `crate::geo::Point`, `f64`
    Path {
        segments: Vec<String>,
        arguments: Vec<TypeRef>,
    },
    /// `&T` / `&mut T`
    Reference { mutable: bool, inner: Box<TypeRef> },
    /// `dyn Any`
    TraitObject { segments: Vec<String> },
    /// `()`
    Unit,
    /// Anything the proxy engine cannot forward (tuples, `impl Trait`, ...)
    Unsupported(String),
}

impl TypeRef {
    pub fn path(segments: &[&str]) -> Self {
        TypeRef::Path {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(segments: &[&str], arguments: Vec<TypeRef>) -> Self {
        TypeRef::Path {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            arguments,
        }
    }

    /// Last path segment, if this is a path or trait object
    pub fn last_segment(&self) -> Option<&str> {
        match self {
            TypeRef::Path { segments, .. } | TypeRef::TraitObject { segments } => {
                segments.last().map(String::as_str)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Path {
                segments,
                arguments,
            } => {
                write!(f, "{}", segments.join("::"))?;
                if !arguments.is_empty() {
                    let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", arguments.join(", "))?;
                }
                Ok(())
            }
            TypeRef::Reference { mutable, inner } => {
                if *mutable {
                    write!(f, "&mut {inner}")
                } else {
                    write!(f, "&{inner}")
                }
            }
            TypeRef::TraitObject { segments } => write!(f, "dyn {}", segments.join("::")),
            TypeRef::Unit => f.write_str("()"),
            TypeRef::Unsupported(text) => f.write_str(text),
        }
    }
}

/// Receiver of a function as written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelfParam {
    Ref,
    RefMut,
    /// `self`, `mut self` or a typed `self: Box<Self>`
    Owned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDecl {
    /// Binding name; `None` when the pattern is not a plain identifier
    pub name: Option<String>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    pub name: String,
    pub receiver: Option<SelfParam>,
    pub params: Vec<ParamDecl>,
    /// `None` when the function returns `()` implicitly
    pub return_type: Option<TypeRef>,
    pub generic: bool,
    /// Whether a body follows the signature (a default method in a trait)
    pub has_body: bool,
}

impl FunctionSig {
    /// Every type named by the signature, return type last
    pub fn types(&self) -> impl Iterator<Item = &TypeRef> {
        self.params.iter().map(|p| &p.ty).chain(self.return_type.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TraitItem {
    Method(FunctionSig),
    AssociatedType(String),
    AssociatedConst { name: String, has_default: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitDecl {
    pub generic: bool,
    pub supertraits: Vec<TypeRef>,
    pub items: Vec<TraitItem>,
}

impl TraitDecl {
    pub fn methods(&self) -> impl Iterator<Item = &FunctionSig> {
        self.items.iter().filter_map(|item| match item {
            TraitItem::Method(sig) => Some(sig),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDecl {
    pub generic: bool,
    pub derives_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Trait(TraitDecl),
    Struct(StructDecl),
    UnitStruct,
    Enum,
    Union,
    Function(FunctionSig),
    TypeAlias,
}

impl DeclKind {
    /// Article + noun used in diagnostics ("a struct", "an enum")
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Trait(_) => "a trait",
            DeclKind::Struct(_) => "a struct",
            DeclKind::UnitStruct => "a unit struct",
            DeclKind::Enum => "an enum",
            DeclKind::Union => "a union",
            DeclKind::Function(_) => "a function",
            DeclKind::TypeAlias => "a type alias",
        }
    }
}

/// `#[path(arguments)]` as written on a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub path: String,
    /// Token text between the delimiters, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl Attribute {
    /// Whether the attribute path ends with `marker` (`proxy_for` matches
    /// both `#[proxy_for]` and `#[proxygen_runtime::proxy_for]`)
    pub fn is_marker(&self, marker: &str) -> bool {
        self.path.rsplit("::").next().map(str::trim) == Some(marker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: Option<PathBuf>,
    /// Zero-based line of the declaration's first attribute or keyword
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub module_path: String,
    #[serde(skip)]
    pub scope: ScopeId,
    pub kind: DeclKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Carries `pub`, `pub(crate)` or another visibility modifier
    pub visible: bool,
}

impl Declaration {
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module_path, self.name)
    }

    pub fn marker(&self, marker: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_marker(marker))
    }

    pub fn as_trait(&self) -> Option<&TraitDecl> {
        match &self.kind {
            DeclKind::Trait(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSig> {
        match &self.kind {
            DeclKind::Function(sig) => Some(sig),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::generic(
            &["Vec"],
            vec![TypeRef::generic(
                &["Box"],
                vec![TypeRef::TraitObject {
                    segments: vec!["Any".to_string()],
                }],
            )],
        );
        assert_eq!(ty.to_string(), "Vec<Box<dyn Any>>");

        let reference = TypeRef::Reference {
            mutable: false,
            inner: Box::new(TypeRef::path(&["MethodCall"])),
        };
        assert_eq!(reference.to_string(), "&MethodCall");
        assert_eq!(TypeRef::Unit.to_string(), "()");
    }

    #[test]
    fn test_marker_matching() {
        let plain = Attribute {
            path: "proxy_for".to_string(),
            arguments: Some("Vector".to_string()),
        };
        let qualified = Attribute {
            path: "proxygen_runtime::proxy_for".to_string(),
            arguments: Some("Vector".to_string()),
        };
        assert!(plain.is_marker("proxy_for"));
        assert!(qualified.is_marker("proxy_for"));
        assert!(!plain.is_marker("with_proxy"));
    }
}
