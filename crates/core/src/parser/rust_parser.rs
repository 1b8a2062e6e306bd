use crate::{
    error::{Error, Result},
    host::{ScopeId, SymbolTable},
    parser::declaration_collector::DeclarationCollector,
};
use std::path::Path;
use tree_sitter::Parser;

pub struct RustParser {
    parser: Parser,
}

impl RustParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| Error::TreeSitterError(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<tree_sitter::Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| Error::ParseError("Failed to parse source code".to_string()))
    }

    /// Parse `source` as the module `module_path` and add its declarations to
    /// `table`. Returns the scope created for the file.
    pub fn collect(
        &mut self,
        source: &str,
        module_path: &str,
        file: Option<&Path>,
        table: &mut SymbolTable,
    ) -> Result<ScopeId> {
        let tree = self.parse(source)?;
        let mut collector = DeclarationCollector::new(source, file, table);
        collector.collect(&tree.root_node(), module_path)
    }
}
