use crate::{
    error::Result,
    host::{
        Attribute, DeclKind, Declaration, FunctionSig, ImplFact, ImplFactKind, Location, ParamDecl,
        ScopeId, SelfParam, StructDecl, SymbolTable, TraitDecl, TraitItem, TypeRef,
    },
    parser::utils::{attributes_before, field_name, node_text, parse_type, path_segments},
};
use std::path::Path;
use tree_sitter::Node;

/// Item kinds the collector records or descends into
const ITEM_KINDS: &[&str] = &[
    "function_item",
    "trait_item",
    "struct_item",
    "enum_item",
    "union_item",
    "type_item",
    "impl_item",
    "mod_item",
    "use_declaration",
];

/// One entry of a `use` tree
#[derive(Debug, Clone, PartialEq, Eq)]
enum UseEntry {
    Alias { alias: String, path: Vec<String> },
    Glob(Vec<String>),
}

/// Walks the items of one parsed file and records them in a [`SymbolTable`].
///
/// Inline `mod` blocks open a nested scope. Function bodies are never
/// entered: items declared inside them are invisible to the generator.
pub struct DeclarationCollector<'a> {
    source: &'a str,
    file: Option<&'a Path>,
    table: &'a mut SymbolTable,
}

impl<'a> DeclarationCollector<'a> {
    pub fn new(source: &'a str, file: Option<&'a Path>, table: &'a mut SymbolTable) -> Self {
        Self {
            source,
            file,
            table,
        }
    }

    pub fn collect(&mut self, root: &Node, module_path: &str) -> Result<ScopeId> {
        if root.has_error() {
            tracing::warn!(
                "Syntax errors in {}; declarations may be incomplete",
                self.file
                    .map(|f| f.display().to_string())
                    .unwrap_or_else(|| module_path.to_string())
            );
        }
        let scope = self
            .table
            .add_scope(module_path, self.file.map(Path::to_path_buf));
        self.visit_items(root, module_path, scope)?;
        Ok(scope)
    }

    fn visit_items(&mut self, container: &Node, module_path: &str, scope: ScopeId) -> Result<()> {
        for child in container.children(&mut container.walk()) {
            if ITEM_KINDS.contains(&child.kind()) && self.is_cfg_gated(&child)? {
                tracing::debug!(
                    "Skipping cfg-gated {} at line {}",
                    child.kind(),
                    child.start_position().row + 1
                );
                continue;
            }
            match child.kind() {
                "function_item" => self.handle_function(&child, module_path, scope)?,
                "trait_item" => self.handle_trait(&child, module_path, scope)?,
                "struct_item" => self.handle_struct(&child, module_path, scope)?,
                "enum_item" => self.push_declaration(&child, module_path, scope, DeclKind::Enum)?,
                "union_item" => {
                    self.push_declaration(&child, module_path, scope, DeclKind::Union)?
                }
                "type_item" => {
                    self.push_declaration(&child, module_path, scope, DeclKind::TypeAlias)?
                }
                "impl_item" => self.handle_impl(&child, scope)?,
                "mod_item" => self.handle_module(&child, module_path)?,
                "use_declaration" => self.handle_use(&child, scope)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn push_declaration(
        &mut self,
        node: &Node,
        module_path: &str,
        scope: ScopeId,
        kind: DeclKind,
    ) -> Result<()> {
        let Some(name) = field_name(node, self.source)? else {
            tracing::debug!(
                "Skipping unnamed {} at line {}",
                node.kind(),
                node.start_position().row + 1
            );
            return Ok(());
        };
        let (attributes, line) = attributes_before(node, self.source)?;
        let declaration = Declaration {
            name,
            module_path: module_path.to_string(),
            scope,
            kind,
            attributes,
            location: Some(Location {
                file: self.file.map(Path::to_path_buf),
                line,
            }),
            visible: has_visibility(node),
        };
        tracing::debug!(
            "Collected {} `{}`",
            declaration.kind.describe(),
            declaration.qualified_name()
        );
        self.table.add_declaration(declaration);
        Ok(())
    }

    fn handle_function(&mut self, node: &Node, module_path: &str, scope: ScopeId) -> Result<()> {
        let signature = self.function_signature(node)?;
        self.push_declaration(node, module_path, scope, DeclKind::Function(signature))
    }

    fn handle_trait(&mut self, node: &Node, module_path: &str, scope: ScopeId) -> Result<()> {
        let mut supertraits = Vec::new();
        if let Some(bounds) = node.child_by_field_name("bounds") {
            for bound in bounds.named_children(&mut bounds.walk()) {
                match bound.kind() {
                    // `'static`, `?Sized`
                    "lifetime" | "removed_trait_bound" => {}
                    _ => supertraits.push(parse_type(&bound, self.source)?),
                }
            }
        }

        let mut items = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for item in body.named_children(&mut body.walk()) {
                if item.kind() != "attribute_item" && self.is_cfg_gated(&item)? {
                    continue;
                }
                match item.kind() {
                    "function_signature_item" | "function_item" => {
                        items.push(TraitItem::Method(self.function_signature(&item)?));
                    }
                    "associated_type" => {
                        let name = field_name(&item, self.source)?.unwrap_or_default();
                        items.push(TraitItem::AssociatedType(name));
                    }
                    "const_item" => {
                        let name = field_name(&item, self.source)?.unwrap_or_default();
                        items.push(TraitItem::AssociatedConst {
                            name,
                            has_default: item.child_by_field_name("value").is_some(),
                        });
                    }
                    _ => {}
                }
            }
        }

        let decl = TraitDecl {
            generic: node.child_by_field_name("type_parameters").is_some(),
            supertraits,
            items,
        };
        self.push_declaration(node, module_path, scope, DeclKind::Trait(decl))
    }

    fn handle_struct(&mut self, node: &Node, module_path: &str, scope: ScopeId) -> Result<()> {
        let kind = match node.child_by_field_name("body") {
            None => DeclKind::UnitStruct,
            Some(_) => {
                let (attributes, _) = attributes_before(node, self.source)?;
                DeclKind::Struct(StructDecl {
                    generic: node.child_by_field_name("type_parameters").is_some(),
                    derives_default: attributes.iter().any(derives_default),
                })
            }
        };
        self.push_declaration(node, module_path, scope, kind)
    }

    /// Records `impl Default for T` and inherent `pub fn name() -> Self`
    fn handle_impl(&mut self, node: &Node, scope: ScopeId) -> Result<()> {
        let Some(self_type) = node.child_by_field_name("type") else {
            return Ok(());
        };
        let self_type = parse_type(&self_type, self.source)?;
        let generic = node.child_by_field_name("type_parameters").is_some();

        match node.child_by_field_name("trait") {
            Some(trait_node) => {
                let segments = path_segments(&trait_node, self.source)?;
                let is_default = segments.last().is_some_and(|name| name == "Default");
                if is_default && !generic {
                    self.table.add_impl_fact(ImplFact {
                        scope,
                        self_type,
                        kind: ImplFactKind::Default,
                    });
                }
            }
            None => {
                let Some(body) = node.child_by_field_name("body") else {
                    return Ok(());
                };
                for item in body.named_children(&mut body.walk()) {
                    if item.kind() != "function_item" || !has_visibility(&item) {
                        continue;
                    }
                    let signature = self.function_signature(&item)?;
                    if is_zero_arg_constructor(&signature, &self_type) {
                        self.table.add_impl_fact(ImplFact {
                            scope,
                            self_type: self_type.clone(),
                            kind: ImplFactKind::Constructor(signature.name),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_module(&mut self, node: &Node, module_path: &str) -> Result<()> {
        let Some(name) = field_name(node, self.source)? else {
            return Ok(());
        };
        let child_path = format!("{module_path}::{name}");
        match node.child_by_field_name("body") {
            Some(body) => {
                let scope = self
                    .table
                    .add_scope(&child_path, self.file.map(Path::to_path_buf));
                self.visit_items(&body, &child_path, scope)
            }
            None => {
                self.table.add_module(child_path);
                Ok(())
            }
        }
    }

    fn handle_use(&mut self, node: &Node, scope: ScopeId) -> Result<()> {
        let Some(argument) = node.child_by_field_name("argument") else {
            return Ok(());
        };
        let mut entries = Vec::new();
        collect_use_tree(&argument, self.source, &[], &mut entries)?;
        for entry in entries {
            match entry {
                UseEntry::Alias { alias, path } => self.table.add_import(scope, alias, path),
                UseEntry::Glob(path) => self.table.add_glob_import(scope, path),
            }
        }
        Ok(())
    }

    fn function_signature(&self, node: &Node) -> Result<FunctionSig> {
        let name = field_name(node, self.source)?.unwrap_or_default();
        let mut receiver = None;
        let mut params = Vec::new();

        if let Some(parameters) = node.child_by_field_name("parameters") {
            for param in parameters.named_children(&mut parameters.walk()) {
                match param.kind() {
                    "self_parameter" => {
                        receiver = Some(self_parameter(node_text(&param, self.source)?));
                    }
                    "parameter" => {
                        let pattern = param.child_by_field_name("pattern");
                        if pattern.is_some_and(|p| p.kind() == "self") {
                            // `self: Box<Self>` and friends
                            receiver = Some(SelfParam::Owned);
                            continue;
                        }
                        let ty = match param.child_by_field_name("type") {
                            Some(ty) => parse_type(&ty, self.source)?,
                            None => TypeRef::Unsupported(node_text(&param, self.source)?.to_string()),
                        };
                        let name = match pattern {
                            Some(p) if p.kind() == "identifier" => {
                                Some(node_text(&p, self.source)?.to_string())
                            }
                            _ => None,
                        };
                        params.push(ParamDecl { name, ty });
                    }
                    "variadic_parameter" => params.push(ParamDecl {
                        name: None,
                        ty: TypeRef::Unsupported("...".to_string()),
                    }),
                    _ => {}
                }
            }
        }

        let return_type = match node.child_by_field_name("return_type") {
            Some(ty) => Some(parse_type(&ty, self.source)?),
            None => None,
        };

        Ok(FunctionSig {
            name,
            receiver,
            params,
            return_type,
            generic: node.child_by_field_name("type_parameters").is_some(),
            has_body: node.child_by_field_name("body").is_some(),
        })
    }

    /// Whether `node` carries a `#[cfg(..)]` attribute
    fn is_cfg_gated(&self, node: &Node) -> Result<bool> {
        let (attributes, _) = attributes_before(node, self.source)?;
        Ok(attributes.iter().any(|attribute| attribute.path == "cfg"))
    }
}

fn self_parameter(text: &str) -> SelfParam {
    let text = text.trim();
    if !text.starts_with('&') {
        return SelfParam::Owned;
    }
    if text.split_whitespace().any(|token| token.ends_with("mut")) {
        SelfParam::RefMut
    } else {
        SelfParam::Ref
    }
}

fn derives_default(attribute: &Attribute) -> bool {
    attribute.path == "derive"
        && attribute.arguments.as_deref().is_some_and(|arguments| {
            arguments
                .split(',')
                .any(|derive| derive.trim().rsplit("::").next() == Some("Default"))
        })
}

fn has_visibility(node: &Node) -> bool {
    node.children(&mut node.walk())
        .any(|child| child.kind() == "visibility_modifier")
}

fn is_zero_arg_constructor(signature: &FunctionSig, self_type: &TypeRef) -> bool {
    if signature.receiver.is_some() || !signature.params.is_empty() || signature.generic {
        return false;
    }
    match &signature.return_type {
        Some(TypeRef::Path {
            segments,
            arguments,
        }) if arguments.is_empty() => {
            matches!(segments.as_slice(), [name] if name == "Self")
                || segments.last().map(String::as_str) == self_type.last_segment()
        }
        _ => false,
    }
}

fn collect_use_tree(
    node: &Node,
    source: &str,
    prefix: &[String],
    entries: &mut Vec<UseEntry>,
) -> Result<()> {
    let extend = |segments: Vec<String>| -> Vec<String> {
        prefix.iter().cloned().chain(segments).collect()
    };

    match node.kind() {
        "use_as_clause" => {
            let (Some(path), Some(alias)) = (
                node.child_by_field_name("path"),
                node.child_by_field_name("alias"),
            ) else {
                return Ok(());
            };
            let alias = node_text(&alias, source)?.to_string();
            if alias != "_" {
                entries.push(UseEntry::Alias {
                    alias,
                    path: extend(path_segments(&path, source)?),
                });
            }
        }
        "scoped_use_list" => {
            let base = match node.child_by_field_name("path") {
                Some(path) => extend(path_segments(&path, source)?),
                None => prefix.to_vec(),
            };
            if let Some(list) = node.child_by_field_name("list") {
                collect_use_tree(&list, source, &base, entries)?;
            }
        }
        "use_list" => {
            for item in node.named_children(&mut node.walk()) {
                collect_use_tree(&item, source, prefix, entries)?;
            }
        }
        "use_wildcard" => {
            let path = match node.named_child(0) {
                Some(path) => extend(path_segments(&path, source)?),
                None => prefix.to_vec(),
            };
            entries.push(UseEntry::Glob(path));
        }
        "identifier" | "scoped_identifier" | "self" | "crate" | "super" => {
            let segments = path_segments(node, source)?;
            let path = extend(segments);
            let alias = match path.as_slice() {
                // `use a::b::{self}` imports `b`
                [.., module, last] if last == "self" => Some(module.clone()),
                [.., last] if last != "self" => Some(last.clone()),
                _ => None,
            };
            if let Some(alias) = alias {
                let path = match path.last().map(String::as_str) {
                    Some("self") => path[..path.len() - 1].to_vec(),
                    _ => path,
                };
                entries.push(UseEntry::Alias { alias, path });
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::SymbolHost, parser::RustParser};

    fn collect(source: &str, module_path: &str) -> SymbolTable {
        let mut parser = RustParser::new().unwrap();
        let mut table = SymbolTable::new();
        parser.collect(source, module_path, None, &mut table).unwrap();
        table
    }

    fn find<'t>(table: &'t SymbolTable, qualified: &str) -> &'t Declaration {
        let id = table.find_declaration(qualified).unwrap();
        table.declaration(id).unwrap()
    }

    #[test]
    fn test_collect_trait_members() {
        let table = collect(
            r#"
pub trait Vector: Named + Send {
    type Output;
    const DIMENSIONS: usize;
    fn get_x(&self) -> f64;
    fn set_y(&mut self, value: f64);
    fn length(&self) -> f64 { 0.0 }
    fn origin() -> Self where Self: Sized;
}
"#,
            "crate::shapes",
        );

        let decl = find(&table, "crate::shapes::Vector");
        let vector = decl.as_trait().unwrap();
        assert!(!vector.generic);
        assert_eq!(
            vector.supertraits,
            vec![TypeRef::path(&["Named"]), TypeRef::path(&["Send"])]
        );
        let names: Vec<&str> = vector.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["get_x", "set_y", "length", "origin"]);

        let set_y = vector.methods().nth(1).unwrap();
        assert_eq!(set_y.receiver, Some(SelfParam::RefMut));
        assert_eq!(set_y.params[0].name.as_deref(), Some("value"));
        assert_eq!(set_y.return_type, None);

        let origin = vector.methods().nth(3).unwrap();
        assert_eq!(origin.receiver, None);
        assert!(vector.items.contains(&TraitItem::AssociatedType("Output".to_string())));
        assert!(vector.items.contains(&TraitItem::AssociatedConst {
            name: "DIMENSIONS".to_string(),
            has_default: false,
        }));
        assert!(!vector.methods().nth(1).unwrap().has_body);
        assert!(vector.methods().nth(2).unwrap().has_body);
        assert!(decl.visible);
    }

    #[test]
    fn test_collect_marked_function_and_inline_module() {
        let table = collect(
            r#"
use proxygen_runtime::{MethodCall, proxy_for};
use std::any::Any;

mod nested {
    pub struct Inner;
}

#[proxy_for(Vector)]
pub fn vector_proxy(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
    fn hidden() {}
    Box::new(())
}
"#,
            "crate",
        );

        let marked = table.declarations_with_marker("proxy_for");
        assert_eq!(marked.len(), 1);
        let decl = table.declaration(marked[0]).unwrap();
        assert_eq!(decl.qualified_name(), "crate::vector_proxy");
        assert_eq!(decl.location.as_ref().map(|l| l.line), Some(8));

        let sig = decl.as_function().unwrap();
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].ty.to_string(), "&MethodCall");
        assert_eq!(sig.params[1].ty.to_string(), "Vec<Box<dyn Any>>");

        assert!(table.find_declaration("crate::nested::Inner").is_some());
        assert!(table.find_declaration("crate::hidden").is_none());
        assert!(table.find_declaration("crate::vector_proxy::hidden").is_none());

        let scope = decl.scope;
        assert_eq!(
            table
                .resolve_path(scope, &["MethodCall".to_string()])
                .as_deref(),
            Some("proxygen_runtime::MethodCall")
        );
        assert_eq!(
            table.resolve_path(scope, &["Any".to_string()]).as_deref(),
            Some("std::any::Any")
        );
    }

    #[test]
    fn test_collect_handler_facts() {
        let table = collect(
            r#"
#[derive(Debug, Default)]
pub struct Derived { calls: u32 }

pub struct Manual;

pub struct WithConstructor { calls: u32 }

impl WithConstructor {
    pub fn new() -> Self { Self { calls: 0 } }
    fn private() -> Self { Self { calls: 1 } }
}

pub struct Generic<T> { value: T }

impl Default for Manual {
    fn default() -> Self { Manual }
}
"#,
            "crate",
        );

        let derived = table.find_declaration("crate::Derived").unwrap();
        let manual = table.find_declaration("crate::Manual").unwrap();
        let with_ctor = table.find_declaration("crate::WithConstructor").unwrap();

        assert!(table.implements_default(derived));
        assert!(table.implements_default(manual));
        assert!(!table.implements_default(with_ctor));
        assert_eq!(table.zero_arg_constructor(with_ctor).as_deref(), Some("new"));
        assert_eq!(find(&table, "crate::Manual").kind, DeclKind::UnitStruct);
        assert_eq!(
            find(&table, "crate::Generic").kind,
            DeclKind::Struct(StructDecl {
                generic: true,
                derives_default: false
            })
        );
    }

    #[test]
    fn test_use_tree_entries() {
        let source = "use crate::a::{self, b::C as D, e::*};";
        let mut parser = RustParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let root = tree.root_node();
        let declaration = root.named_child(0).unwrap();
        let argument = declaration.child_by_field_name("argument").unwrap();

        let mut entries = Vec::new();
        collect_use_tree(&argument, source, &[], &mut entries).unwrap();
        let segments = |path: &str| path.split("::").map(str::to_string).collect::<Vec<_>>();
        assert_eq!(
            entries,
            vec![
                UseEntry::Alias {
                    alias: "a".to_string(),
                    path: segments("crate::a"),
                },
                UseEntry::Alias {
                    alias: "D".to_string(),
                    path: segments("crate::a::b::C"),
                },
                UseEntry::Glob(segments("crate::a::e")),
            ]
        );
    }

    #[test]
    fn test_cfg_gated_items_are_skipped() {
        let table = collect(
            r#"
pub trait Kept {
    fn ping(&self);
    #[cfg(feature = "extra")]
    fn extra(&self);
}

#[cfg(test)]
mod tests {
    #[with_proxy(EchoHandler)]
    pub trait InTest { fn ping(&self); }
}

#[cfg(feature = "extra")]
pub struct Gated;

trait Private { fn ping(&self); }
pub(crate) struct CrateVisible;
"#,
            "crate",
        );

        assert!(table.find_declaration("crate::tests::InTest").is_none());
        assert!(table.declarations_with_marker("with_proxy").is_empty());
        assert!(table.find_declaration("crate::Gated").is_none());

        let kept = find(&table, "crate::Kept");
        let names: Vec<&str> = kept.as_trait().unwrap().methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ping"]);

        assert!(!find(&table, "crate::Private").visible);
        assert!(find(&table, "crate::CrateVisible").visible);
    }

    #[test]
    fn test_self_parameter_forms() {
        assert_eq!(self_parameter("&self"), SelfParam::Ref);
        assert_eq!(self_parameter("&mut self"), SelfParam::RefMut);
        assert_eq!(self_parameter("&'a mut self"), SelfParam::RefMut);
        assert_eq!(self_parameter("mut self"), SelfParam::Owned);
        assert_eq!(self_parameter("self"), SelfParam::Owned);
    }
}
