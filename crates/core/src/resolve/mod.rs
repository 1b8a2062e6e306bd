//! Type resolution and member enumeration over a [`SymbolHost`](crate::host::SymbolHost)

pub mod members;
pub mod types;

pub use members::MemberEnumerator;
pub use types::TypeResolver;
