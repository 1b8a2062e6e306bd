//! Read-only view of the declarations a generation pass works on.
//!
//! The engine never touches syntax trees directly: it asks a [`SymbolHost`]
//! for marked declarations, resolves paths through it and inspects the
//! structured [`Declaration`]s it hands back.

pub mod declaration;
pub mod symbol_table;

pub use declaration::{
    Attribute, DeclId, DeclKind, Declaration, FunctionSig, Location, ParamDecl, ScopeId,
    SelfParam, StructDecl, TraitDecl, TraitItem, TypeRef,
};
pub use symbol_table::{ImplFact, ImplFactKind, ModuleScope, SymbolTable};

/// Query surface over the compiled program's declarations
pub trait SymbolHost {
    /// Declarations carrying `#[marker(...)]`, in source order
    fn declarations_with_marker(&self, marker: &str) -> Vec<DeclId>;

    fn declaration(&self, id: DeclId) -> Option<&Declaration>;

    /// Look up a declaration by its fully qualified path (`crate::a::B`)
    fn find_declaration(&self, qualified_name: &str) -> Option<DeclId>;

    /// Resolve a path as written inside `scope` to its fully qualified form.
    ///
    /// Returns `None` when a single-segment name is neither a primitive,
    /// an import, a local declaration nor part of the prelude.
    fn resolve_path(&self, scope: ScopeId, segments: &[String]) -> Option<String>;

    /// Whether `Default` is derived or implemented for the declaration
    fn implements_default(&self, id: DeclId) -> bool;

    /// Name of an inherent `fn() -> Self`, preferring `new`
    fn zero_arg_constructor(&self, id: DeclId) -> Option<String>;
}
