use std::io;

/// Errors that can occur while generating proxies
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`{function}` must have the following signature: {expected}")]
    ShapeViolation { function: String, expected: String },

    #[error("Proxy can be generated only for traits, but `{name}` is {found}")]
    NotAnInterface { name: String, found: String },

    #[error("Cannot resolve type `{type_text}` used by `{owner}`: {reason}")]
    UnresolvableType {
        owner: String,
        type_text: String,
        reason: String,
    },

    #[error("`{handler}` cannot handle calls for `{interface}`: {reason}")]
    InvalidHandlerTarget {
        interface: String,
        handler: String,
        reason: String,
    },

    #[error("Malformed `#[{marker}]` marker on `{declaration}`: {reason}")]
    InvalidMarker {
        marker: String,
        declaration: String,
        reason: String,
    },

    #[error("Cannot generate a proxy for `{interface}`: {reason}")]
    Unsupported { interface: String, reason: String },

    #[error("`{interface}` already has a registered proxy `{existing}`")]
    DuplicateRegistration { interface: String, existing: String },

    #[error("Proxy `{class_name}` for `{interface}` collides with the proxy generated for `{existing}`")]
    ProxyNameCollision {
        class_name: String,
        interface: String,
        existing: String,
    },

    #[error("Internal fault: {0}")]
    InternalFault(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Proxy generation failed with {count} error(s):\n{messages}")]
    GenerationFailed { count: usize, messages: String },
}

impl Error {
    /// Whether the error belongs to a single declaration and leaves the rest of
    /// the pass untouched.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::ShapeViolation { .. }
                | Error::NotAnInterface { .. }
                | Error::UnresolvableType { .. }
                | Error::InvalidHandlerTarget { .. }
                | Error::InvalidMarker { .. }
                | Error::Unsupported { .. }
                | Error::DuplicateRegistration { .. }
                | Error::ProxyNameCollision { .. }
        )
    }
}

/// Result type alias for proxygen operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_violation_message_names_expected_signature() {
        let err = Error::ShapeViolation {
            function: "crate::proxy".to_string(),
            expected: "fn proxy(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any>"
                .to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("`crate::proxy` must have the following signature"));
        assert!(message.contains("Vec<Box<dyn Any>>"));
    }

    #[test]
    fn test_local_errors() {
        let local = Error::NotAnInterface {
            name: "Point".to_string(),
            found: "a struct".to_string(),
        };
        assert!(local.is_local());
        assert!(!Error::InternalFault("boom".to_string()).is_local());
    }
}
