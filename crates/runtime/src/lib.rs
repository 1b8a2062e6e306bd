//! proxygen-runtime - types used by generated proxies
//!
//! Generated code reaches this crate through the configured runtime path
//! (`proxygen_runtime` by default). User code implements [`ProxyHandler`] or
//! writes dispatch functions taking a [`MethodCall`].

use std::any::{Any, TypeId, type_name};
use std::fmt;

pub use proxygen_markers::{proxy_for, with_proxy};

/// Description of one forwarded call. Generated proxies keep these in
/// `const`s, one per member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodCall {
    name: &'static str,
    argument_types: &'static [&'static str],
    result_type: &'static str,
}

impl MethodCall {
    pub const fn new(
        name: &'static str,
        argument_types: &'static [&'static str],
        result_type: &'static str,
    ) -> Self {
        Self {
            name,
            argument_types,
            result_type,
        }
    }

    /// `getX`/`setX` for properties, the method name otherwise
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Qualified names of the declared parameter types
    pub fn argument_types(&self) -> &'static [&'static str] {
        self.argument_types
    }

    /// Qualified name of the declared result type, `()` for none
    pub fn result_type(&self) -> &'static str {
        self.result_type
    }

    pub fn is_getter(&self) -> bool {
        self.name.starts_with("get") && self.argument_types.is_empty()
    }

    pub fn is_setter(&self) -> bool {
        self.name.starts_with("set") && self.argument_types.len() == 1
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}",
            self.name,
            self.argument_types.join(", "),
            self.result_type
        )
    }
}

/// Receives every call made on a `#[with_proxy]` proxy
pub trait ProxyHandler {
    fn handle(&self, call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any>;
}

impl<F> ProxyHandler for F
where
    F: Fn(&MethodCall, Vec<Box<dyn Any>>) -> Box<dyn Any>,
{
    fn handle(&self, call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
        self(call, args)
    }
}

/// Builds a proxy boxed as `Box<dyn Trait>`, itself boxed as `Box<dyn Any>`
pub type ProxyFactory = fn() -> Box<dyn Any>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("No proxy found for {interface}")]
    NoProxyFound { interface: String },

    #[error("Proxy for {interface} cannot be returned as {requested}")]
    ProxyTypeMismatch {
        interface: String,
        requested: &'static str,
    },
}

/// Convert a dispatch result into the member's declared return type.
///
/// Results of `()` members are discarded, so dispatchers may return any
/// value for them.
///
/// # Panics
///
/// When `value` holds anything other than a `T`. A proxy has no way to
/// report this to its caller.
pub fn cast<T: Any>(call: &MethodCall, value: Box<dyn Any>) -> T {
    let value = if TypeId::of::<T>() == TypeId::of::<()>() {
        Box::new(()) as Box<dyn Any>
    } else {
        value
    };
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => panic!(
            "dispatcher returned the wrong type for `{call}`: expected {}",
            type_name::<T>()
        ),
    }
}

/// Borrow argument `index` of a call as a `T`
pub fn argument<T: Any>(args: &[Box<dyn Any>], index: usize) -> Option<&T> {
    args.get(index)?.downcast_ref::<T>()
}

/// Run the factory registered for `key`
pub fn create<K: Copy + PartialEq>(
    table: &[(K, ProxyFactory)],
    key: K,
    name: &str,
) -> Result<Box<dyn Any>, ProxyError> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, factory)| factory())
        .ok_or_else(|| {
            tracing::debug!("No factory registered for {}", name);
            ProxyError::NoProxyFound {
                interface: name.to_string(),
            }
        })
}

/// [`create`], then unwrap the `Box<T>` the factory produced
pub fn instantiate<K: Copy + PartialEq, T: ?Sized + 'static>(
    table: &[(K, ProxyFactory)],
    key: K,
    name: &str,
) -> Result<Box<T>, ProxyError> {
    create(table, key, name)?
        .downcast::<Box<T>>()
        .map(|proxy| *proxy)
        .map_err(|_| ProxyError::ProxyTypeMismatch {
            interface: name.to_string(),
            requested: type_name::<T>(),
        })
}
