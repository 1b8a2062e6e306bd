//! Source text of one proxy type per [`GenerationRequest`]

pub mod writer;

pub use writer::SourceWriter;

use crate::types::{
    DispatchTarget, GenerationRequest, InterfaceShape, MethodCallDescriptor, ProxyRegistryEntry,
};

/// Path the generated code uses to reach the runtime crate
pub const DEFAULT_RUNTIME_PATH: &str = "proxygen_runtime";

/// Source of one proxy type, ready to append to the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedProxy {
    pub class_name: String,
    pub interface: String,
    pub text: String,
}

impl EmittedProxy {
    pub fn registry_entry(&self) -> ProxyRegistryEntry {
        ProxyRegistryEntry::new(&self.interface, &self.class_name)
    }
}

/// A trait member rendered as a forwarding override
#[derive(Debug, Clone, PartialEq, Eq)]
struct ForwardedMember {
    owner: String,
    signature: String,
    call: MethodCallDescriptor,
    /// Parameter names, forwarded boxed in declaration order
    arguments: Vec<String>,
}

/// Renders proxy types. Output is a pure function of the request and the
/// runtime path.
#[derive(Debug, Clone)]
pub struct ProxyEmitter {
    runtime_path: String,
}

impl Default for ProxyEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_PATH)
    }
}

impl ProxyEmitter {
    pub fn new(runtime_path: impl Into<String>) -> Self {
        Self {
            runtime_path: runtime_path.into(),
        }
    }

    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }

    pub fn emit(&self, request: &GenerationRequest) -> EmittedProxy {
        let shape = &request.shape;
        let class_name = &request.class_name;
        let members = forwarded_members(shape);
        let mut writer = SourceWriter::new();

        writer.line(format!("/// Generated proxy for `{}`.", shape.qualified_name));
        writer.line("#[derive(Debug, Clone, Copy, Default)]");
        writer.line(format!("pub struct {class_name};"));

        if let Some(block) = &request.initialization_block {
            writer.blank();
            writer.block(format!("impl {class_name}"), |w| {
                w.lines(block);
            });
        }

        for trait_name in &shape.traits {
            writer.blank();
            let header = format!("impl {trait_name} for {class_name}");
            let owned: Vec<&ForwardedMember> =
                members.iter().filter(|m| &m.owner == trait_name).collect();
            if owned.is_empty() {
                writer.line(format!("{header} {{}}"));
                continue;
            }
            writer.block(header, |w| {
                for (index, member) in owned.iter().enumerate() {
                    if index > 0 {
                        w.blank();
                    }
                    self.render_member(w, member, &request.target);
                }
            });
        }

        tracing::debug!(
            "Emitted `{}` for `{}` ({} members)",
            class_name,
            shape.qualified_name,
            members.len()
        );

        EmittedProxy {
            class_name: class_name.clone(),
            interface: shape.qualified_name.clone(),
            text: writer.finish(),
        }
    }

    fn render_member(&self, w: &mut SourceWriter, member: &ForwardedMember, target: &DispatchTarget) {
        let rt = &self.runtime_path;
        let call = &member.call;
        let tags: Vec<String> = call
            .argument_types
            .iter()
            .map(|ty| format!("{:?}", ty.type_tag()))
            .collect();
        let arguments = if member.arguments.is_empty() {
            "Vec::new()".to_string()
        } else {
            let boxed: Vec<String> = member
                .arguments
                .iter()
                .map(|name| format!("Box::new({name}) as Box<dyn std::any::Any>"))
                .collect();
            format!("vec![{}]", boxed.join(", "))
        };

        w.block(&member.signature, |w| {
            w.line(format!(
                "const CALL: {rt}::MethodCall = {rt}::MethodCall::new({:?}, &[{}], {:?});",
                call.name,
                tags.join(", "),
                call.result_type.type_tag()
            ));
            w.line(format!(
                "{rt}::cast::<{}>(&CALL, {})",
                call.result_type.render(),
                target.call_expression(rt, &arguments)
            ));
        });
    }
}

/// Getters, setters and methods of `shape` in one uniform form: properties
/// first (getter, then setter when mutable), then methods.
fn forwarded_members(shape: &InterfaceShape) -> Vec<ForwardedMember> {
    let mut members = Vec::new();

    for property in &shape.properties {
        let ty = property.ty.render();
        members.push(ForwardedMember {
            owner: property.owner.clone(),
            signature: format!("fn {}(&self) -> {ty}", property.getter_name()),
            call: MethodCallDescriptor::getter(&property.name, &property.ty),
            arguments: Vec::new(),
        });
        if property.mutable {
            members.push(ForwardedMember {
                owner: property.owner.clone(),
                signature: format!("fn {}(&mut self, value: {ty})", property.setter_name()),
                call: MethodCallDescriptor::setter(&property.name, &property.ty),
                arguments: vec!["value".to_string()],
            });
        }
    }

    for method in &shape.methods {
        let mut params = vec![method.receiver.as_str().to_string()];
        params.extend(
            method
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty.render())),
        );
        let mut signature = format!("fn {}({})", method.name, params.join(", "));
        if !method.return_type.is_unit() {
            signature.push_str(&format!(" -> {}", method.return_type.render()));
        }
        members.push(ForwardedMember {
            owner: method.owner.clone(),
            signature,
            call: MethodCallDescriptor::method(
                &method.name,
                method.parameters.iter().map(|p| p.ty.clone()).collect(),
                method.return_type.clone(),
            ),
            arguments: method.parameters.iter().map(|p| p.name.clone()).collect(),
        });
    }

    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MethodMember, Parameter, PropertyMember, Receiver, TypeDescriptor};

    fn property(name: &str, ty: TypeDescriptor, mutable: bool, owner: &str) -> PropertyMember {
        PropertyMember {
            name: name.to_string(),
            ty,
            mutable,
            owner: owner.to_string(),
        }
    }

    fn vector_request() -> GenerationRequest {
        let owner = "crate::shapes::Vector";
        let f64_ty = TypeDescriptor::new("f64");
        let mut shape = InterfaceShape::new(owner);
        shape.properties = vec![
            property("x", f64_ty.clone(), false, owner),
            property("y", f64_ty.clone(), true, owner),
            property(
                "other",
                TypeDescriptor::new("std::vec::Vec").with_arguments(vec![TypeDescriptor::new("i32")]),
                true,
                owner,
            ),
        ];
        shape.methods = vec![
            MethodMember {
                name: "length".to_string(),
                receiver: Receiver::Ref,
                parameters: Vec::new(),
                return_type: f64_ty.clone(),
                owner: owner.to_string(),
            },
            MethodMember {
                name: "scale".to_string(),
                receiver: Receiver::RefMut,
                parameters: vec![
                    Parameter {
                        name: "factor".to_string(),
                        ty: f64_ty,
                    },
                    Parameter {
                        name: "label".to_string(),
                        ty: TypeDescriptor::new("std::string::String").nullable(),
                    },
                ],
                return_type: TypeDescriptor::unit(),
                owner: owner.to_string(),
            },
        ];
        GenerationRequest::new(
            shape,
            DispatchTarget::FreeFunction("crate::shapes::vector_proxy".to_string()),
        )
    }

    fn handler_request() -> GenerationRequest {
        let mut shape = InterfaceShape::new("crate::shapes::Vector1");
        shape.traits.push("crate::shapes::Named".to_string());
        shape.traits.push("crate::shapes::Marker".to_string());
        shape.properties = vec![
            property("x", TypeDescriptor::new("f64"), false, "crate::shapes::Vector1"),
            property(
                "name",
                TypeDescriptor::new("std::string::String").nullable(),
                false,
                "crate::shapes::Named",
            ),
        ];
        GenerationRequest::new(
            shape,
            DispatchTarget::HandlerInstance("ProxyForVector1::proxy_handler()".to_string()),
        )
        .with_initialization_block(
            "fn proxy_handler() -> &'static crate::shapes::RecordingHandler {\n    static HANDLER: std::sync::LazyLock<crate::shapes::RecordingHandler> =\n        std::sync::LazyLock::new(<crate::shapes::RecordingHandler as Default>::default);\n    &HANDLER\n}",
        )
    }

    #[test]
    fn test_emit_free_function_proxy() {
        let emitted = ProxyEmitter::default().emit(&vector_request());
        assert_eq!(emitted.class_name, "ProxyForVector");
        assert_eq!(
            emitted.registry_entry(),
            ProxyRegistryEntry::new("crate::shapes::Vector", "ProxyForVector")
        );
        insta::assert_snapshot!("vector_free_function", emitted.text.trim_end());
    }

    #[test]
    fn test_emit_handler_proxy_with_supertraits() {
        let emitted = ProxyEmitter::new("rt").emit(&handler_request());
        insta::assert_snapshot!("vector1_handler", emitted.text.trim_end());
    }

    #[test]
    fn test_emission_is_deterministic() {
        let emitter = ProxyEmitter::default();
        let request = vector_request();
        assert_eq!(emitter.emit(&request), emitter.emit(&request.clone()));
    }

    #[test]
    fn test_call_descriptors_per_member() {
        let members = forwarded_members(&vector_request().shape);
        let calls: Vec<(&str, usize, String)> = members
            .iter()
            .map(|m| {
                (
                    m.call.name.as_str(),
                    m.call.argument_types.len(),
                    m.call.result_type.render(),
                )
            })
            .collect();
        assert_eq!(
            calls,
            vec![
                ("getX", 0, "f64".to_string()),
                ("getY", 0, "f64".to_string()),
                ("setY", 1, "()".to_string()),
                ("getOther", 0, "std::vec::Vec<i32>".to_string()),
                ("setOther", 1, "()".to_string()),
                ("length", 0, "f64".to_string()),
                ("scale", 2, "()".to_string()),
            ]
        );
        assert_eq!(members[6].arguments, vec!["factor", "label"]);
    }

    #[test]
    fn test_empty_interface_still_implements_trait() {
        let request = GenerationRequest::new(
            InterfaceShape::new("crate::Empty"),
            DispatchTarget::FreeFunction("crate::dispatch".to_string()),
        );
        let emitted = ProxyEmitter::default().emit(&request);
        assert!(emitted.text.ends_with("impl crate::Empty for ProxyForEmpty {}\n"));
    }
}
