//! Interface -> proxy lookup table emitted after every proxy

use crate::{
    emit::SourceWriter,
    error::{Error, Result},
    types::{ProxyRegistryEntry, shape::simple_name},
};

/// Accumulates registry entries in registration order
#[derive(Debug, Default, Clone)]
pub struct RegistryBuilder {
    entries: Vec<ProxyRegistryEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished proxy. An interface can be registered once, and
    /// two interfaces cannot share a proxy name or a factory function name.
    pub fn register(&mut self, entry: ProxyRegistryEntry) -> Result<()> {
        if let Some(existing) = self.entries.iter().find(|e| e.interface == entry.interface) {
            return Err(Error::DuplicateRegistration {
                interface: entry.interface,
                existing: existing.class_name.clone(),
            });
        }
        if let Some(existing) = self.entries.iter().find(|e| e.class_name == entry.class_name) {
            return Err(Error::ProxyNameCollision {
                class_name: entry.class_name,
                interface: entry.interface,
                existing: existing.interface.clone(),
            });
        }
        let factory = factory_name(&entry);
        if let Some(existing) = self.entries.iter().find(|e| factory_name(e) == factory) {
            return Err(Error::ProxyNameCollision {
                class_name: factory,
                interface: entry.interface,
                existing: existing.interface.clone(),
            });
        }
        tracing::debug!("Registered `{}` -> `{}`", entry.interface, entry.class_name);
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[ProxyRegistryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ProxyRegistryEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source of the `ProxyInterface` key enum, the factory table and the
    /// `ProxyProvider` accessors. Valid Rust even when nothing was registered.
    pub fn emit(&self, runtime_path: &str) -> String {
        let rt = runtime_path;
        let mut w = SourceWriter::new();

        w.line("/// Interfaces with a generated proxy.");
        w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        w.block("pub enum ProxyInterface", |w| {
            for entry in &self.entries {
                w.line(format!("{},", entry.simple_name()));
            }
        });
        w.blank();

        w.block("impl ProxyInterface", |w| {
            w.line("/// Every interface, in registration order.");
            w.line("pub const ALL: &'static [ProxyInterface] = &[");
            for entry in &self.entries {
                w.line(format!("    ProxyInterface::{},", entry.simple_name()));
            }
            w.line("];");
            w.blank();
            w.block("pub fn qualified_name(self) -> &'static str", |w| {
                w.block("match self", |w| {
                    for entry in &self.entries {
                        w.line(format!(
                            "ProxyInterface::{} => {:?},",
                            entry.simple_name(),
                            entry.interface
                        ));
                    }
                });
            });
            w.blank();
            w.block("pub fn from_qualified_name(name: &str) -> Option<Self>", |w| {
                w.line("Self::ALL");
                w.line("    .iter()");
                w.line("    .copied()");
                w.line("    .find(|interface| interface.qualified_name() == name)");
            });
        });
        w.blank();

        w.block("impl std::fmt::Display for ProxyInterface", |w| {
            w.block(
                "fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result",
                |w| {
                    w.line("f.write_str(self.qualified_name())");
                },
            );
        });
        w.blank();

        w.line("/// Ties a trait object type to its registry key.");
        w.block("pub trait Proxied", |w| {
            w.line("const INTERFACE: ProxyInterface;");
        });

        for entry in &self.entries {
            w.blank();
            w.block(format!("impl Proxied for dyn {}", entry.interface), |w| {
                w.line(format!(
                    "const INTERFACE: ProxyInterface = ProxyInterface::{};",
                    entry.simple_name()
                ));
            });
        }

        for entry in &self.entries {
            w.blank();
            w.block(
                format!("fn {}() -> Box<dyn std::any::Any>", factory_name(entry)),
                |w| {
                    w.line(format!(
                        "let proxy: Box<dyn {}> = Box::new({});",
                        entry.interface, entry.class_name
                    ));
                    w.line("Box::new(proxy)");
                },
            );
        }
        w.blank();

        w.line("/// Factory of every generated proxy, keyed by interface.");
        w.line(format!(
            "pub static PROXY_FACTORIES: &[(ProxyInterface, {rt}::ProxyFactory)] = &["
        ));
        for entry in &self.entries {
            w.line(format!(
                "    (ProxyInterface::{}, {}),",
                entry.simple_name(),
                factory_name(entry)
            ));
        }
        w.line("];");
        w.blank();

        w.line("/// Entry point for obtaining proxy instances.");
        w.line("pub struct ProxyProvider;");
        w.blank();
        w.block("impl ProxyProvider", |w| {
            w.line("/// Proxy for `interface`, boxed as the trait object `T`.");
            w.block(
                format!(
                    "pub fn create_proxy_for<T: ?Sized + 'static>(interface: ProxyInterface) -> Result<Box<T>, {rt}::ProxyError>"
                ),
                |w| {
                    w.line(format!(
                        "{rt}::instantiate(PROXY_FACTORIES, interface, interface.qualified_name())"
                    ));
                },
            );
            w.blank();
            w.line("/// Proxy for the interface with the given qualified name, holding a `Box<dyn Trait>`.");
            w.block(
                format!(
                    "pub fn create_proxy_by_name(name: &str) -> Result<Box<dyn std::any::Any>, {rt}::ProxyError>"
                ),
                |w| {
                    w.block("match ProxyInterface::from_qualified_name(name)", |w| {
                        w.line(format!(
                            "Some(interface) => {rt}::create(PROXY_FACTORIES, interface, name),"
                        ));
                        w.line(format!(
                            "None => Err({rt}::ProxyError::NoProxyFound {{ interface: name.to_string() }}),"
                        ));
                    });
                },
            );
            w.blank();
            w.line("/// Proxy for the trait object type `T`, e.g. `create_proxy::<dyn Vector>()`.");
            w.block(
                format!(
                    "pub fn create_proxy<T: ?Sized + Proxied + 'static>() -> Result<Box<T>, {rt}::ProxyError>"
                ),
                |w| {
                    w.line("Self::create_proxy_for::<T>(T::INTERFACE)");
                },
            );
        });

        w.finish()
    }
}

/// `new_proxy_for_<snake_case simple name>`
fn factory_name(entry: &ProxyRegistryEntry) -> String {
    format!("new_proxy_for_{}", snake_case(simple_name(&entry.interface)))
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if previous_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            previous_lower = false;
        } else {
            out.push(c);
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(interface: &str) -> ProxyRegistryEntry {
        ProxyRegistryEntry::new(interface, crate::types::request::proxy_class_name(interface))
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = RegistryBuilder::new();
        registry.register(entry("crate::shapes::Vector")).unwrap();

        let err = registry.register(entry("crate::shapes::Vector")).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateRegistration { ref interface, ref existing }
                if interface == "crate::shapes::Vector" && existing == "ProxyForVector"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_collision_rejected() {
        let mut registry = RegistryBuilder::new();
        registry.register(entry("crate::a::Shape")).unwrap();
        let err = registry.register(entry("crate::b::Shape")).unwrap_err();
        assert!(matches!(
            err,
            Error::ProxyNameCollision { ref existing, .. } if existing == "crate::a::Shape"
        ));
    }

    #[test]
    fn test_factory_name_collision_rejected() {
        let mut registry = RegistryBuilder::new();
        registry.register(entry("crate::NamedShape")).unwrap();
        let err = registry.register(entry("crate::Named_Shape")).unwrap_err();
        assert!(matches!(
            err,
            Error::ProxyNameCollision { ref class_name, ref interface, ref existing }
                if class_name == "new_proxy_for_named_shape"
                    && interface == "crate::Named_Shape"
                    && existing == "crate::NamedShape"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("Vector1"), "vector1");
        assert_eq!(snake_case("NamedShape"), "named_shape");
        assert_eq!(snake_case("HTTPClient"), "httpclient");
        assert_eq!(snake_case("Shape2D"), "shape2_d");
    }

    #[test]
    fn test_emit_registry() {
        let mut registry = RegistryBuilder::new();
        registry.register(entry("crate::shapes::Vector")).unwrap();
        registry.register(entry("crate::shapes::Vector1")).unwrap();
        insta::assert_snapshot!("registry_two_entries", registry.emit("proxygen_runtime").trim_end());
    }

    #[test]
    fn test_emit_empty_registry() {
        let text = RegistryBuilder::new().emit("rt");
        assert!(text.contains("pub enum ProxyInterface {\n}\n"));
        assert!(text.contains("pub static PROXY_FACTORIES: &[(ProxyInterface, rt::ProxyFactory)] = &[\n];\n"));
        assert!(!text.contains("impl Proxied for"));
    }
}
