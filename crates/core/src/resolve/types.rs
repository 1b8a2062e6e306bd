use crate::{
    error::{Error, Result},
    host::{ScopeId, SymbolHost, TypeRef},
    types::TypeDescriptor,
};

const OPTION_PATHS: &[&str] = &["std::option::Option", "core::option::Option"];

/// Turns type syntax written in some module into a [`TypeDescriptor`]
pub struct TypeResolver<'h, H: SymbolHost + ?Sized> {
    host: &'h H,
}

impl<'h, H: SymbolHost + ?Sized> TypeResolver<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// Resolve `ty` as written in `scope`. `owner` names the declaration the
    /// type belongs to and only feeds error messages.
    pub fn resolve(&self, owner: &str, scope: ScopeId, ty: &TypeRef) -> Result<TypeDescriptor> {
        match ty {
            TypeRef::Unit => Ok(TypeDescriptor::unit()),
            TypeRef::Path {
                segments,
                arguments,
            } => {
                let qualified = self.host.resolve_path(scope, segments).ok_or_else(|| {
                    unresolvable(owner, ty, "no such type is in scope".to_string())
                })?;

                if let Some(decl) = self
                    .host
                    .find_declaration(&qualified)
                    .and_then(|id| self.host.declaration(id))
                {
                    if decl.as_trait().is_some() {
                        return Err(unresolvable(
                            owner,
                            ty,
                            format!("`{qualified}` is a trait, not a type"),
                        ));
                    }
                }

                let mut resolved = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    resolved.push(self.resolve(owner, scope, argument)?);
                }

                if OPTION_PATHS.contains(&qualified.as_str()) {
                    if let [inner] = resolved.as_slice() {
                        if !inner.nullable {
                            return Ok(inner.clone().nullable());
                        }
                    }
                }
                Ok(TypeDescriptor::new(qualified).with_arguments(resolved))
            }
            TypeRef::Reference { .. } => Err(unresolvable(
                owner,
                ty,
                "borrowed values cannot be boxed into `Box<dyn Any>`".to_string(),
            )),
            TypeRef::TraitObject { .. } => Err(unresolvable(
                owner,
                ty,
                "trait objects have no static type tag".to_string(),
            )),
            TypeRef::Unsupported(_) => Err(unresolvable(
                owner,
                ty,
                "this type syntax cannot be forwarded".to_string(),
            )),
        }
    }

    /// Structural check: every name inside `ty` resolves in `scope`.
    ///
    /// Unlike [`resolve`](Self::resolve) this accepts references and trait
    /// objects, so it can be applied to dispatch function signatures.
    pub fn validate(&self, scope: ScopeId, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Unit => true,
            TypeRef::Path {
                segments,
                arguments,
            } => {
                self.host.resolve_path(scope, segments).is_some()
                    && arguments.iter().all(|a| self.validate(scope, a))
            }
            TypeRef::Reference { inner, .. } => self.validate(scope, inner),
            TypeRef::TraitObject { segments } => self.host.resolve_path(scope, segments).is_some(),
            TypeRef::Unsupported(_) => false,
        }
    }
}

fn unresolvable(owner: &str, ty: &TypeRef, reason: String) -> Error {
    Error::UnresolvableType {
        owner: owner.to_string(),
        type_text: ty.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::SymbolTable, parser::RustParser};

    fn table(source: &str) -> SymbolTable {
        let mut parser = RustParser::new().unwrap();
        let mut table = SymbolTable::new();
        parser.collect(source, "crate", None, &mut table).unwrap();
        table
    }

    fn resolve(table: &SymbolTable, ty: &TypeRef) -> Result<TypeDescriptor> {
        TypeResolver::new(table).resolve("crate::Owner", crate::host::ScopeId(0), ty)
    }

    #[test]
    fn test_resolve_primitive_prelude_and_generics() {
        let table = table("use std::collections::HashMap;\npub struct Point;");

        assert_eq!(
            resolve(&table, &TypeRef::path(&["f64"])).unwrap(),
            TypeDescriptor::new("f64")
        );
        assert_eq!(
            resolve(&table, &TypeRef::path(&["Point"])).unwrap(),
            TypeDescriptor::new("crate::Point")
        );

        let map = TypeRef::generic(
            &["HashMap"],
            vec![
                TypeRef::path(&["String"]),
                TypeRef::generic(&["Vec"], vec![TypeRef::path(&["i32"])]),
            ],
        );
        let resolved = resolve(&table, &map).unwrap();
        assert_eq!(
            resolved.render(),
            "std::collections::HashMap<std::string::String, std::vec::Vec<i32>>"
        );
        assert_eq!(resolved.type_tag(), "std::collections::HashMap");
    }

    #[test]
    fn test_option_becomes_nullable() {
        let table = table("");
        let optional = TypeRef::generic(&["Option"], vec![TypeRef::path(&["String"])]);
        let resolved = resolve(&table, &optional).unwrap();
        assert_eq!(resolved, TypeDescriptor::new("std::string::String").nullable());

        let nested = TypeRef::generic(&["Option"], vec![optional]);
        let resolved = resolve(&table, &nested).unwrap();
        assert!(!resolved.nullable);
        assert_eq!(resolved.qualified_name, "std::option::Option");
        assert_eq!(
            resolved.render(),
            "std::option::Option<std::option::Option<std::string::String>>"
        );
    }

    #[test]
    fn test_unit_and_failures() {
        let table = table("pub trait Shape {}");
        assert!(resolve(&table, &TypeRef::Unit).unwrap().is_unit());

        let reference = TypeRef::Reference {
            mutable: false,
            inner: Box::new(TypeRef::path(&["str"])),
        };
        for ty in [
            reference,
            TypeRef::path(&["T"]),
            TypeRef::path(&["Shape"]),
            TypeRef::Unsupported("(i32, i32)".to_string()),
        ] {
            let err = resolve(&table, &ty).unwrap_err();
            assert!(
                matches!(err, Error::UnresolvableType { ref owner, .. } if owner == "crate::Owner"),
                "{ty}: {err}"
            );
        }
    }

    #[test]
    fn test_lifetime_arguments_are_unresolvable() {
        let table = table(
            "use std::borrow::Cow;\npub fn label() -> Cow<'static, str> { Cow::Borrowed(\"\") }",
        );
        let id = table.find_declaration("crate::label").unwrap();
        let sig = table.declaration(id).unwrap().as_function().unwrap();
        let ty = sig.return_type.as_ref().unwrap();

        let err = resolve(&table, ty).unwrap_err();
        assert!(
            matches!(err, Error::UnresolvableType { ref type_text, .. } if type_text == "Cow<'static, str>"),
            "{err}"
        );
        assert!(!TypeResolver::new(&table).validate(crate::host::ScopeId(0), ty));
    }

    #[test]
    fn test_validate_accepts_dispatch_signature_types() {
        let table = table("use std::any::Any;\nuse proxygen_runtime::MethodCall;");
        let resolver = TypeResolver::new(&table);
        let scope = crate::host::ScopeId(0);

        let call = TypeRef::Reference {
            mutable: false,
            inner: Box::new(TypeRef::path(&["MethodCall"])),
        };
        let boxed = TypeRef::generic(
            &["Box"],
            vec![TypeRef::TraitObject {
                segments: vec!["Any".to_string()],
            }],
        );
        assert!(resolver.validate(scope, &call));
        assert!(resolver.validate(scope, &boxed));
        assert!(!resolver.validate(
            scope,
            &TypeRef::TraitObject {
                segments: vec!["Missing".to_string()]
            }
        ));
    }
}
