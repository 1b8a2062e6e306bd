//! Rust front end: tree-sitter parsing into a [`SymbolTable`](crate::host::SymbolTable)

pub mod declaration_collector;
pub mod rust_parser;
pub mod scanner;
pub mod utils;

// Re-export commonly used items
pub use declaration_collector::DeclarationCollector;
pub use rust_parser::RustParser;
pub use scanner::{module_path_for, scan_directory, scan_into};
