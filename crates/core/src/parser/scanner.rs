use crate::{
    error::{Error, Result},
    host::SymbolTable,
    parser::RustParser,
};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Parse every `.rs` file below `root` into one symbol table.
///
/// `root` plays the role of a crate's `src/` directory: `lib.rs` and
/// `main.rs` directly inside it map to `crate`, every other file to the
/// module path its location implies. Files are visited in name order so
/// repeated scans produce identical tables.
pub fn scan_directory(root: &Path) -> Result<SymbolTable> {
    let mut table = SymbolTable::new();
    scan_into(root, &mut table)?;
    Ok(table)
}

/// Like [`scan_directory`], adding to an existing table
pub fn scan_into(root: &Path, table: &mut SymbolTable) -> Result<()> {
    if !root.is_dir() {
        return Err(Error::ConfigError(format!(
            "Source directory {} does not exist",
            root.display()
        )));
    }

    let mut parser = RustParser::new()?;
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name().to_str()));

    for entry in walker {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs")
        {
            continue;
        }

        let Some(module_path) = module_path_for(root, path) else {
            tracing::debug!("Skipping {}: not a module file", path.display());
            continue;
        };
        let source = fs::read_to_string(path)?;
        tracing::debug!("Scanning {} as {}", path.display(), module_path);
        parser.collect(&source, &module_path, Some(path), table)?;
    }
    Ok(())
}

/// Module path implied by a file's location below the source root
pub fn module_path_for(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut segments = vec!["crate".to_string()];
    for component in relative.parent()?.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?.to_string()),
            _ => return None,
        }
    }

    let stem = relative.file_stem()?.to_str()?;
    let at_root = segments.len() == 1;
    match stem {
        "mod" if !at_root => {}
        "lib" | "main" if at_root => {}
        _ => segments.push(stem.to_string()),
    }
    Some(segments.join("::"))
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.starts_with('.') && n.len() > 1)
}
