pub mod analyze;
pub mod generate;
pub mod init;

pub use analyze::analyze_command;
pub use generate::{GenerateOptions, generate_command};
pub use init::init_command;

use anyhow::{Context, Result};
use proxygen_core::{Config, SymbolTable, parser::scan_into};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `explicit` if given, else the nearest proxygen.json, else the defaults
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::find_config_file(&std::env::current_dir()?),
    };
    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            Config::load_from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Directories given on the command line win over the config's
pub(crate) fn source_dirs(cli: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    if !cli.is_empty() {
        cli.to_vec()
    } else if !config.source_dirs.is_empty() {
        config.source_dirs.clone()
    } else {
        vec![PathBuf::from("src")]
    }
}

pub(crate) fn scan_sources(dirs: &[PathBuf]) -> Result<SymbolTable> {
    let mut table = SymbolTable::new();
    for dir in dirs {
        scan_into(dir, &mut table)
            .with_context(|| format!("Failed to scan {}", dir.display()))?;
    }
    debug!("Collected {} declarations", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_dir_precedence() {
        let mut config = Config::default();
        assert_eq!(source_dirs(&[], &config), vec![PathBuf::from("src")]);

        config.source_dirs = vec![PathBuf::from("lib")];
        assert_eq!(source_dirs(&[], &config), vec![PathBuf::from("lib")]);
        assert_eq!(
            source_dirs(&[PathBuf::from("other")], &config),
            vec![PathBuf::from("other")]
        );
    }
}
