use serde::Serialize;

use super::{shape::simple_name, InterfaceShape};

/// Prefix of every generated proxy type
pub const PROXY_PREFIX: &str = "ProxyFor";

/// Where a proxy sends its calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DispatchTarget {
    /// Path of a `fn(&MethodCall, Vec<Box<dyn Any>>) -> Box<dyn Any>`
    FreeFunction(String),
    /// Expression evaluating to a `&impl ProxyHandler`
    HandlerInstance(String),
}

impl DispatchTarget {
    /// Call expression forwarding `&CALL` and `arguments` to the target.
    pub fn call_expression(&self, runtime_path: &str, arguments: &str) -> String {
        match self {
            DispatchTarget::FreeFunction(path) => format!("{path}(&CALL, {arguments})"),
            DispatchTarget::HandlerInstance(access) => {
                format!("{runtime_path}::ProxyHandler::handle({access}, &CALL, {arguments})")
            }
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            DispatchTarget::FreeFunction(path) => path,
            DispatchTarget::HandlerInstance(access) => access,
        }
    }
}

/// Everything the emitter needs to produce one proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub shape: InterfaceShape,
    pub target: DispatchTarget,
    /// Raw item text placed in the proxy's inherent impl block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialization_block: Option<String>,
    pub class_name: String,
}

impl GenerationRequest {
    pub fn new(shape: InterfaceShape, target: DispatchTarget) -> Self {
        let class_name = proxy_class_name(&shape.qualified_name);
        Self {
            shape,
            target,
            initialization_block: None,
            class_name,
        }
    }

    pub fn with_initialization_block(mut self, block: impl Into<String>) -> Self {
        self.initialization_block = Some(block.into());
        self
    }
}

/// `ProxyFor` + the interface's simple name
pub fn proxy_class_name(interface_qualified_name: &str) -> String {
    format!("{PROXY_PREFIX}{}", simple_name(interface_qualified_name))
}

/// Interface → generated proxy pair recorded once the proxy text is complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRegistryEntry {
    pub interface: String,
    pub class_name: String,
}

impl ProxyRegistryEntry {
    pub fn new(interface: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            class_name: class_name.into(),
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_uses_simple_name() {
        assert_eq!(proxy_class_name("crate::shapes::Vector1"), "ProxyForVector1");
        let request = GenerationRequest::new(
            InterfaceShape::new("crate::geo::Point"),
            DispatchTarget::FreeFunction("crate::geo::dispatch".to_string()),
        );
        assert_eq!(request.class_name, "ProxyForPoint");
        assert!(request.initialization_block.is_none());
    }

    #[test]
    fn test_call_expressions() {
        let free = DispatchTarget::FreeFunction("crate::shapes::vector_proxy".to_string());
        assert_eq!(
            free.call_expression("proxygen_runtime", "Vec::new()"),
            "crate::shapes::vector_proxy(&CALL, Vec::new())"
        );

        let handler = DispatchTarget::HandlerInstance("&crate::shapes::Echo".to_string());
        assert_eq!(
            handler.call_expression("rt", "args"),
            "rt::ProxyHandler::handle(&crate::shapes::Echo, &CALL, args)"
        );
    }
}
