use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use super::{DeclId, DeclKind, Declaration, ScopeId, SymbolHost, TypeRef};

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

const PRELUDE: &[(&str, &str)] = &[
    ("String", "std::string::String"),
    ("Vec", "std::vec::Vec"),
    ("Box", "std::boxed::Box"),
    ("Option", "std::option::Option"),
    ("Result", "std::result::Result"),
];

const EXTERN_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Imports can alias imports; bail out of pathological chains.
const MAX_IMPORT_DEPTH: usize = 8;

/// Name resolution context of one module
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleScope {
    pub module_path: String,
    /// Alias -> path segments as written in the `use` declaration
    pub imports: BTreeMap<String, Vec<String>>,
    /// Module paths brought in with `use path::*`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub glob_imports: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImplFactKind {
    /// `impl Default for T`
    Default,
    /// Inherent `fn name() -> Self` taking no arguments
    Constructor(String),
}

/// Something an `impl` block tells us about its self type
#[derive(Debug, Clone, Serialize)]
pub struct ImplFact {
    #[serde(skip)]
    pub scope: ScopeId,
    pub self_type: TypeRef,
    pub kind: ImplFactKind,
}

/// In-memory symbol table filled by the Rust front end
#[derive(Debug, Default, Serialize)]
pub struct SymbolTable {
    scopes: Vec<ModuleScope>,
    declarations: Vec<Declaration>,
    impl_facts: Vec<ImplFact>,
    #[serde(skip)]
    modules: HashSet<String>,
    #[serde(skip)]
    by_qualified_name: HashMap<String, DeclId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scope(&mut self, module_path: impl Into<String>, file: Option<PathBuf>) -> ScopeId {
        let module_path = module_path.into();
        self.modules.insert(module_path.clone());
        self.scopes.push(ModuleScope {
            module_path,
            imports: BTreeMap::new(),
            glob_imports: Vec::new(),
            file,
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Register an out-of-line `mod name;` whose file may be scanned later
    pub fn add_module(&mut self, module_path: impl Into<String>) {
        self.modules.insert(module_path.into());
    }

    pub fn add_import(&mut self, scope: ScopeId, alias: impl Into<String>, path: Vec<String>) {
        if let Some(scope) = self.scopes.get_mut(scope.0) {
            scope.imports.insert(alias.into(), path);
        }
    }

    pub fn add_glob_import(&mut self, scope: ScopeId, module: Vec<String>) {
        if let Some(scope) = self.scopes.get_mut(scope.0) {
            scope.glob_imports.push(module);
        }
    }

    pub fn add_declaration(&mut self, declaration: Declaration) -> DeclId {
        let id = DeclId(self.declarations.len());
        self.by_qualified_name
            .entry(declaration.qualified_name())
            .or_insert(id);
        self.declarations.push(declaration);
        id
    }

    pub fn add_impl_fact(&mut self, fact: ImplFact) {
        self.impl_facts.push(fact);
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ModuleScope> {
        self.scopes.get(id.0)
    }

    pub fn scopes(&self) -> &[ModuleScope] {
        &self.scopes
    }

    pub fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclId(index), decl))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Files the table was built from, in scan order
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = Vec::new();
        for scope in &self.scopes {
            if let Some(file) = &scope.file {
                if !files.contains(file) {
                    files.push(file.clone());
                }
            }
        }
        files
    }

    fn absolute(&self, scope: &ModuleScope, segments: &[String], depth: usize) -> Option<String> {
        let (first, rest) = segments.split_first()?;
        match first.as_str() {
            "crate" => Some(segments.join("::")),
            "self" => Some(join(&scope.module_path, rest)),
            "super" => {
                let mut module = scope.module_path.as_str();
                let mut remaining = segments;
                while let Some(("super", tail)) = remaining
                    .split_first()
                    .map(|(head, tail)| (head.as_str(), tail))
                {
                    module = parent_module(module)?;
                    remaining = tail;
                }
                Some(join(module, remaining))
            }
            root if EXTERN_ROOTS.contains(&root) => Some(segments.join("::")),
            _ => {
                if let Some(imported) = scope.imports.get(first) {
                    if depth >= MAX_IMPORT_DEPTH {
                        return None;
                    }
                    let base = self.absolute(scope, imported, depth + 1)?;
                    return Some(join(&base, rest));
                }
                let child = format!("{}::{}", scope.module_path, first);
                if self.modules.contains(&child) {
                    return Some(join(&child, rest));
                }
                Some(segments.join("::"))
            }
        }
    }

    fn resolve_self_type(&self, fact: &ImplFact) -> Option<String> {
        match &fact.self_type {
            TypeRef::Path { segments, .. } => self.resolve_path(fact.scope, segments),
            _ => None,
        }
    }
}

impl SymbolHost for SymbolTable {
    fn declarations_with_marker(&self, marker: &str) -> Vec<DeclId> {
        self.declarations()
            .filter(|(_, decl)| decl.marker(marker).is_some())
            .map(|(id, _)| id)
            .collect()
    }

    fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    fn find_declaration(&self, qualified_name: &str) -> Option<DeclId> {
        self.by_qualified_name.get(qualified_name).copied()
    }

    fn resolve_path(&self, scope: ScopeId, segments: &[String]) -> Option<String> {
        let module_scope = self.scopes.get(scope.0)?;
        // `Self` and `Self::Assoc` depend on the implementing type
        if segments.first().is_some_and(|first| first == "Self") {
            return None;
        }
        let [name] = segments else {
            return self.absolute(module_scope, segments, 0);
        };

        if PRIMITIVES.contains(&name.as_str()) {
            return Some(name.clone());
        }
        if let Some(imported) = module_scope.imports.get(name) {
            return self.absolute(module_scope, imported, 1);
        }
        let local = format!("{}::{}", module_scope.module_path, name);
        if self.by_qualified_name.contains_key(&local) {
            return Some(local);
        }
        let from_glob = module_scope.glob_imports.iter().find_map(|module| {
            let candidate = join(&self.absolute(module_scope, module, 1)?, segments);
            self.by_qualified_name
                .contains_key(&candidate)
                .then_some(candidate)
        });
        if from_glob.is_some() {
            return from_glob;
        }
        PRELUDE
            .iter()
            .find(|(short, _)| short == name)
            .map(|(_, path)| path.to_string())
    }

    fn implements_default(&self, id: DeclId) -> bool {
        let Some(decl) = self.declaration(id) else {
            return false;
        };
        if let DeclKind::Struct(info) = &decl.kind {
            if info.derives_default {
                return true;
            }
        }
        let qualified = decl.qualified_name();
        self.impl_facts.iter().any(|fact| {
            fact.kind == ImplFactKind::Default
                && self.resolve_self_type(fact).as_deref() == Some(qualified.as_str())
        })
    }

    fn zero_arg_constructor(&self, id: DeclId) -> Option<String> {
        let qualified = self.declaration(id)?.qualified_name();
        let mut constructors = self.impl_facts.iter().filter_map(|fact| match &fact.kind {
            ImplFactKind::Constructor(name)
                if self.resolve_self_type(fact).as_deref() == Some(qualified.as_str()) =>
            {
                Some(name.clone())
            }
            _ => None,
        });
        let first = constructors.next()?;
        if first == "new" {
            return Some(first);
        }
        Some(constructors.find(|name| name == "new").unwrap_or(first))
    }
}

fn join(base: &str, rest: &[String]) -> String {
    if rest.is_empty() {
        base.to_string()
    } else {
        format!("{base}::{}", rest.join("::"))
    }
}

fn parent_module(module_path: &str) -> Option<&str> {
    module_path.rsplit_once("::").map(|(parent, _)| parent)
}
