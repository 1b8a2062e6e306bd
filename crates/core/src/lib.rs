//! proxygen-core - compile-time proxy generation for Rust traits
//!
//! This crate provides functionality to:
//! - Scan a crate's sources for `#[proxy_for]` dispatch functions and
//!   `#[with_proxy]` traits
//! - Enumerate trait members (properties and methods) across supertraits
//! - Emit one proxy type per trait plus a registry for looking proxies up
//! - Drive all of the above from a build script through [`Builder`]
pub mod builder;
pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod host;
pub mod output;
pub mod parser;
pub mod processor;
pub mod registry;
pub mod resolve;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use builder::{Builder, GenerationReport};
pub use classify::{Classified, Classifier, MarkerKind};
pub use config::{Config, MarkerConfig};
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticSink, Severity};
pub use emit::{EmittedProxy, ProxyEmitter};
pub use host::{SymbolHost, SymbolTable};
pub use output::{CodeGenerator, FileCodeGenerator, MemoryCodeGenerator, OutputSink};
pub use parser::{RustParser, scan_directory};
pub use processor::{ProcessOutcome, ProxyProcessor};
pub use registry::RegistryBuilder;
