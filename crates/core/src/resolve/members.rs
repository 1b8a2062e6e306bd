use crate::{
    error::{Error, Result},
    host::{
        DeclId, Declaration, FunctionSig, SelfParam, SymbolHost, TraitDecl, TraitItem, TypeRef,
    },
    resolve::TypeResolver,
    types::{InterfaceShape, MethodMember, Parameter, PropertyMember, Receiver, TypeDescriptor},
};

/// Marker traits every type may carry; they add no members
const AUTO_TRAITS: &[&str] = &["Send", "Sync", "Sized", "Unpin"];

const GETTER_PREFIX: &str = "get_";
const SETTER_PREFIX: &str = "set_";

/// Flattens a trait and its supertraits into an [`InterfaceShape`]
pub struct MemberEnumerator<'h, H: SymbolHost + ?Sized> {
    host: &'h H,
    resolver: TypeResolver<'h, H>,
}

impl<'h, H: SymbolHost + ?Sized> MemberEnumerator<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self {
            host,
            resolver: TypeResolver::new(host),
        }
    }

    /// Members of `interface` followed by those of its supertraits, depth
    /// first in bound order. A supertrait reached twice is visited once.
    pub fn enumerate(&self, interface: DeclId) -> Result<InterfaceShape> {
        let decl = self.declaration(interface)?;
        let qualified = decl.qualified_name();
        if decl.as_trait().is_none() {
            return Err(Error::NotAnInterface {
                name: qualified,
                found: decl.kind.describe().to_string(),
            });
        }

        let mut shape = InterfaceShape::new(&qualified);
        shape.traits.clear();
        self.visit(interface, &qualified, &mut shape)?;
        tracing::debug!(
            "Enumerated `{}`: {} traits, {} properties, {} methods",
            qualified,
            shape.traits.len(),
            shape.properties.len(),
            shape.methods.len()
        );
        Ok(shape)
    }

    fn declaration(&self, id: DeclId) -> Result<&'h Declaration> {
        self.host
            .declaration(id)
            .ok_or_else(|| Error::InternalFault(format!("Unknown declaration id {}", id.0)))
    }

    fn visit(&self, id: DeclId, interface: &str, shape: &mut InterfaceShape) -> Result<()> {
        let decl = self.declaration(id)?;
        let qualified = decl.qualified_name();
        if shape.traits.contains(&qualified) {
            return Ok(());
        }
        let Some(trait_decl) = decl.as_trait() else {
            return Err(unsupported(
                interface,
                format!("supertrait `{qualified}` is {}", decl.kind.describe()),
            ));
        };
        if trait_decl.generic {
            return Err(unsupported(
                interface,
                format!("`{qualified}` has generic parameters"),
            ));
        }
        if !decl.visible {
            return Err(unsupported(
                interface,
                format!("`{qualified}` is private; declare it `pub` or `pub(crate)`"),
            ));
        }

        shape.traits.push(qualified.clone());
        self.collect_members(decl, trait_decl, interface, shape)?;

        for bound in &trait_decl.supertraits {
            if let Some(supertrait) = self.supertrait(decl, bound, interface)? {
                self.visit(supertrait, interface, shape)?;
            }
        }
        Ok(())
    }

    /// Resolve one supertrait bound. `None` for auto traits.
    fn supertrait(
        &self,
        decl: &Declaration,
        bound: &TypeRef,
        interface: &str,
    ) -> Result<Option<DeclId>> {
        let TypeRef::Path {
            segments,
            arguments,
        } = bound
        else {
            return Err(unsupported(
                interface,
                format!("unsupported supertrait bound `{bound}`"),
            ));
        };

        let is_auto = segments.last().is_some_and(|name| AUTO_TRAITS.contains(&name.as_str()));
        let is_std = segments.len() == 1
            || matches!(segments.first().map(String::as_str), Some("std" | "core"));
        if is_auto && is_std && arguments.is_empty() {
            return Ok(None);
        }
        if !arguments.is_empty() {
            return Err(unsupported(
                interface,
                format!("generic supertrait `{bound}` cannot be proxied"),
            ));
        }

        self.host
            .resolve_path(decl.scope, segments)
            .and_then(|path| self.host.find_declaration(&path))
            .map(Some)
            .ok_or_else(|| {
                unsupported(
                    interface,
                    format!("supertrait `{bound}` is not declared in the scanned sources"),
                )
            })
    }

    fn collect_members(
        &self,
        decl: &Declaration,
        trait_decl: &TraitDecl,
        interface: &str,
        shape: &mut InterfaceShape,
    ) -> Result<()> {
        let owner = decl.qualified_name();
        for item in &trait_decl.items {
            match item {
                TraitItem::AssociatedType(name) => {
                    return Err(unsupported(
                        interface,
                        format!("`{owner}` declares the associated type `{name}`"),
                    ));
                }
                TraitItem::AssociatedConst {
                    name,
                    has_default: false,
                } => {
                    return Err(unsupported(
                        interface,
                        format!("`{owner}::{name}` is an associated const without a default"),
                    ));
                }
                _ => {}
            }
        }

        let methods: Vec<&FunctionSig> = trait_decl.methods().collect();
        for sig in &methods {
            let Some(receiver) = sig.receiver else {
                if !sig.has_body {
                    return Err(unsupported(
                        interface,
                        format!(
                            "`{owner}::{}` is an associated function without a default body",
                            sig.name
                        ),
                    ));
                }
                continue;
            };
            if receiver == SelfParam::Owned {
                return Err(unsupported(
                    interface,
                    format!("`{owner}::{}` takes `self` by value", sig.name),
                ));
            }
            if sig.generic {
                return Err(unsupported(
                    interface,
                    format!("`{owner}::{}` has generic parameters", sig.name),
                ));
            }

            if let Some(property) = getter_property(sig) {
                let Some(ty) = sig.return_type.as_ref() else {
                    continue;
                };
                let mutable = methods.iter().any(|other| is_setter_for(other, property, ty));
                shape.properties.push(PropertyMember {
                    name: property.to_string(),
                    ty: self.resolver.resolve(&owner, decl.scope, ty)?,
                    mutable,
                    owner: owner.clone(),
                });
                continue;
            }

            let paired = sig
                .name
                .strip_prefix(SETTER_PREFIX)
                .is_some_and(|property| {
                    methods.iter().any(|other| {
                        getter_property(other) == Some(property)
                            && other
                                .return_type
                                .as_ref()
                                .is_some_and(|ty| is_setter_for(sig, property, ty))
                    })
                });
            if paired {
                continue;
            }

            shape.methods.push(self.method_member(&owner, decl, sig, receiver)?);
        }
        Ok(())
    }

    fn method_member(
        &self,
        owner: &str,
        decl: &Declaration,
        sig: &FunctionSig,
        receiver: SelfParam,
    ) -> Result<MethodMember> {
        let mut parameters = Vec::with_capacity(sig.params.len());
        for (index, param) in sig.params.iter().enumerate() {
            parameters.push(Parameter {
                name: param.name.clone().unwrap_or_else(|| format!("arg{index}")),
                ty: self.resolver.resolve(owner, decl.scope, &param.ty)?,
            });
        }
        let return_type = match &sig.return_type {
            Some(ty) => self.resolver.resolve(owner, decl.scope, ty)?,
            None => TypeDescriptor::unit(),
        };
        Ok(MethodMember {
            name: sig.name.clone(),
            receiver: match receiver {
                SelfParam::RefMut => Receiver::RefMut,
                _ => Receiver::Ref,
            },
            parameters,
            return_type,
            owner: owner.to_string(),
        })
    }
}

/// Property name of `get_p(&self) -> T` with a non-unit `T`
fn getter_property(sig: &FunctionSig) -> Option<&str> {
    let property = sig.name.strip_prefix(GETTER_PREFIX)?;
    let returns_value = sig
        .return_type
        .as_ref()
        .is_some_and(|ty| *ty != TypeRef::Unit);
    (!property.is_empty()
        && sig.receiver == Some(SelfParam::Ref)
        && sig.params.is_empty()
        && !sig.generic
        && returns_value)
        .then_some(property)
}

/// Whether `sig` is `set_<property>(&mut self, value: <ty>)` returning unit
fn is_setter_for(sig: &FunctionSig, property: &str, ty: &TypeRef) -> bool {
    sig.name.strip_prefix(SETTER_PREFIX) == Some(property)
        && sig.receiver == Some(SelfParam::RefMut)
        && !sig.generic
        && matches!(sig.params.as_slice(), [param] if param.ty == *ty)
        && matches!(sig.return_type, None | Some(TypeRef::Unit))
}

fn unsupported(interface: &str, reason: String) -> Error {
    Error::Unsupported {
        interface: interface.to_string(),
        reason,
    }
}
