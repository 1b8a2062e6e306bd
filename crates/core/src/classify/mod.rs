//! Marked declarations -> [`GenerationRequest`]s
//!
//! Every declaration is classified on its own; a failure only affects the
//! declaration it belongs to.

use crate::{
    config::MarkerConfig,
    error::{Error, Result},
    host::{Attribute, DeclId, DeclKind, Declaration, FunctionSig, SymbolHost, TypeRef},
    resolve::MemberEnumerator,
    types::{DispatchTarget, GenerationRequest, request::proxy_class_name},
};

/// Which marker a declaration was discovered through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    DispatchFunction,
    HandlerInterface,
}

/// Outcome of classifying one marked declaration
#[derive(Debug)]
pub struct Classified {
    pub id: DeclId,
    /// Qualified name of the marked declaration
    pub declaration: String,
    pub marker: MarkerKind,
    pub outcome: Result<GenerationRequest>,
}

pub struct Classifier<'h, H: SymbolHost + ?Sized> {
    host: &'h H,
    markers: MarkerConfig,
    enumerator: MemberEnumerator<'h, H>,
}

impl<'h, H: SymbolHost + ?Sized> Classifier<'h, H> {
    pub fn new(host: &'h H, markers: &MarkerConfig) -> Self {
        Self {
            host,
            markers: markers.clone(),
            enumerator: MemberEnumerator::new(host),
        }
    }

    /// Whether any declaration carries either marker
    pub fn has_marked_declarations(&self) -> bool {
        !self.dispatch_functions().is_empty() || !self.handler_interfaces().is_empty()
    }

    pub fn dispatch_functions(&self) -> Vec<DeclId> {
        self.host
            .declarations_with_marker(&self.markers.dispatch_function)
    }

    pub fn handler_interfaces(&self) -> Vec<DeclId> {
        self.host
            .declarations_with_marker(&self.markers.handler_interface)
    }

    /// Dispatch functions first, then handler interfaces, each in host order
    pub fn classify_all(&self) -> Vec<Classified> {
        let functions = self
            .dispatch_functions()
            .into_iter()
            .map(|id| (id, MarkerKind::DispatchFunction));
        let interfaces = self
            .handler_interfaces()
            .into_iter()
            .map(|id| (id, MarkerKind::HandlerInterface));

        functions
            .chain(interfaces)
            .map(|(id, marker)| {
                let declaration = self
                    .host
                    .declaration(id)
                    .map(Declaration::qualified_name)
                    .unwrap_or_default();
                let outcome = match marker {
                    MarkerKind::DispatchFunction => self.classify_dispatch_function(id),
                    MarkerKind::HandlerInterface => self.classify_handler_interface(id),
                };
                Classified {
                    id,
                    declaration,
                    marker,
                    outcome,
                }
            })
            .collect()
    }

    /// `#[proxy_for(Trait)] fn f(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any>`
    pub fn classify_dispatch_function(&self, id: DeclId) -> Result<GenerationRequest> {
        let decl = self.declaration(id)?;
        let marker_name = &self.markers.dispatch_function;
        let qualified = decl.qualified_name();

        let Some(sig) = decl.as_function() else {
            return Err(Error::InvalidMarker {
                marker: marker_name.clone(),
                declaration: qualified,
                reason: format!("it can only be placed on a function, found {}", decl.kind.describe()),
            });
        };
        if !decl.visible {
            return Err(Error::InvalidMarker {
                marker: marker_name.clone(),
                declaration: qualified,
                reason: "the function is private; declare it `pub` or `pub(crate)`".to_string(),
            });
        }
        if !has_dispatch_shape(sig) {
            return Err(Error::ShapeViolation {
                function: qualified,
                expected: dispatch_signature(&sig.name),
            });
        }

        let marker = self.marker(decl, marker_name)?;
        let path = single_path_argument(marker, marker_name, &qualified)?;
        let interface = self.resolve_declaration(decl, &path, &qualified)?;
        let interface_decl = self.declaration(interface)?;
        if interface_decl.as_trait().is_none() {
            return Err(Error::NotAnInterface {
                name: interface_decl.qualified_name(),
                found: interface_decl.kind.describe().to_string(),
            });
        }

        let shape = self.enumerator.enumerate(interface)?;
        tracing::debug!("`{}` dispatches `{}`", qualified, shape.qualified_name);
        Ok(GenerationRequest::new(
            shape,
            DispatchTarget::FreeFunction(qualified),
        ))
    }

    /// `#[with_proxy(Handler)] trait T { .. }`
    pub fn classify_handler_interface(&self, id: DeclId) -> Result<GenerationRequest> {
        let decl = self.declaration(id)?;
        let marker_name = &self.markers.handler_interface;
        let qualified = decl.qualified_name();

        if decl.as_trait().is_none() {
            return Err(Error::NotAnInterface {
                name: qualified,
                found: decl.kind.describe().to_string(),
            });
        }

        let marker = self.marker(decl, marker_name)?;
        let path = single_path_argument(marker, marker_name, &qualified)?;
        let handler_path = self
            .host
            .resolve_path(decl.scope, &path)
            .ok_or_else(|| Error::UnresolvableType {
                owner: qualified.clone(),
                type_text: path.join("::"),
                reason: "no such type is in scope".to_string(),
            })?;
        let invalid = |reason: String| Error::InvalidHandlerTarget {
            interface: qualified.clone(),
            handler: handler_path.clone(),
            reason,
        };
        let handler = self
            .host
            .find_declaration(&handler_path)
            .ok_or_else(|| invalid("it is not declared in the scanned sources".to_string()))?;
        let handler_decl = self.declaration(handler)?;
        if !handler_decl.visible {
            return Err(invalid(
                "it is private; declare it `pub` or `pub(crate)`".to_string(),
            ));
        }
        let class_name = proxy_class_name(&qualified);

        let (target, initialization_block) = match &handler_decl.kind {
            DeclKind::UnitStruct => (
                DispatchTarget::HandlerInstance(format!("&{handler_path}")),
                None,
            ),
            DeclKind::Struct(info) if info.generic => {
                return Err(invalid(
                    "generic structs cannot be instantiated without type arguments".to_string(),
                ));
            }
            DeclKind::Struct(_) => {
                let constructor = if self.host.implements_default(handler) {
                    format!("<{handler_path} as Default>::default")
                } else if let Some(name) = self.host.zero_arg_constructor(handler) {
                    format!("{handler_path}::{name}")
                } else {
                    return Err(invalid(
                        "it needs `Default` or a public zero-argument constructor returning `Self`"
                            .to_string(),
                    ));
                };
                (
                    DispatchTarget::HandlerInstance(format!("{class_name}::proxy_handler()")),
                    Some(handler_accessor(&handler_path, &constructor)),
                )
            }
            DeclKind::Trait(_) => {
                return Err(invalid("a trait cannot be instantiated".to_string()));
            }
            other => {
                return Err(invalid(format!(
                    "it must be a struct or unit struct, found {}",
                    other.describe()
                )));
            }
        };

        let shape = self.enumerator.enumerate(id)?;
        tracing::debug!("`{}` is handled by `{}`", qualified, handler_path);
        let request = GenerationRequest::new(shape, target);
        Ok(match initialization_block {
            Some(block) => request.with_initialization_block(block),
            None => request,
        })
    }

    fn declaration(&self, id: DeclId) -> Result<&'h Declaration> {
        self.host
            .declaration(id)
            .ok_or_else(|| Error::InternalFault(format!("Unknown declaration id {}", id.0)))
    }

    fn marker<'d>(&self, decl: &'d Declaration, marker: &str) -> Result<&'d Attribute> {
        decl.marker(marker).ok_or_else(|| {
            Error::InternalFault(format!(
                "`{}` was listed for `#[{marker}]` but does not carry it",
                decl.qualified_name()
            ))
        })
    }

    fn resolve_declaration(
        &self,
        decl: &Declaration,
        path: &[String],
        owner: &str,
    ) -> Result<DeclId> {
        let text = path.join("::");
        let qualified = self
            .host
            .resolve_path(decl.scope, path)
            .ok_or_else(|| Error::UnresolvableType {
                owner: owner.to_string(),
                type_text: text.clone(),
                reason: "no such type is in scope".to_string(),
            })?;
        self.host
            .find_declaration(&qualified)
            .ok_or_else(|| Error::UnresolvableType {
                owner: owner.to_string(),
                type_text: text,
                reason: format!("`{qualified}` is not declared in the scanned sources"),
            })
    }
}

/// Signature every dispatch function must have, spelled with its own name
pub fn dispatch_signature(name: &str) -> String {
    format!("fn {name}(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any>")
}

/// Items of the inherent impl giving handler proxies their shared instance
pub fn handler_accessor(handler_path: &str, constructor: &str) -> String {
    format!(
        "fn proxy_handler() -> &'static {handler_path} {{\n    static HANDLER: std::sync::LazyLock<{handler_path}> =\n        std::sync::LazyLock::new({constructor});\n    &HANDLER\n}}"
    )
}

fn has_dispatch_shape(sig: &FunctionSig) -> bool {
    if sig.receiver.is_some() || sig.generic {
        return false;
    }
    let [call, args] = sig.params.as_slice() else {
        return false;
    };
    let call_ok = matches!(
        &call.ty,
        TypeRef::Reference { mutable: false, inner } if is_plain(inner, "MethodCall")
    );
    let args_ok = single_argument(&args.ty, "Vec").is_some_and(is_boxed_any);
    let result_ok = sig.return_type.as_ref().is_some_and(is_boxed_any);
    call_ok && args_ok && result_ok
}

fn is_plain(ty: &TypeRef, name: &str) -> bool {
    matches!(ty, TypeRef::Path { arguments, .. } if arguments.is_empty())
        && ty.last_segment() == Some(name)
}

/// The only generic argument of `name<T>`
fn single_argument<'t>(ty: &'t TypeRef, name: &str) -> Option<&'t TypeRef> {
    match ty {
        TypeRef::Path { arguments, .. } if ty.last_segment() == Some(name) => match arguments.as_slice() {
            [argument] => Some(argument),
            _ => None,
        },
        _ => None,
    }
}

fn is_boxed_any(ty: &TypeRef) -> bool {
    single_argument(ty, "Box").is_some_and(|inner| {
        matches!(inner, TypeRef::TraitObject { .. }) && inner.last_segment() == Some("Any")
    })
}

/// Parse the marker's argument as exactly one path
fn single_path_argument(attribute: &Attribute, marker: &str, declaration: &str) -> Result<Vec<String>> {
    let invalid = |reason: String| Error::InvalidMarker {
        marker: marker.to_string(),
        declaration: declaration.to_string(),
        reason,
    };
    let arguments: Vec<&str> = attribute
        .arguments
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|argument| !argument.is_empty())
        .collect();

    let [argument] = arguments.as_slice() else {
        return Err(invalid(format!(
            "expected exactly one path argument, found {}",
            arguments.len()
        )));
    };
    let segments: Vec<String> = argument
        .split("::")
        .map(|segment| segment.trim().to_string())
        .collect();
    let valid = segments.iter().all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|first| first.is_alphabetic() || first == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    });
    if !valid {
        return Err(invalid(format!("`{argument}` is not a path")));
    }
    Ok(segments)
}
