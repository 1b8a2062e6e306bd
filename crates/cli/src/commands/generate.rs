use anyhow::{Result, bail};
use proxygen_core::{
    DiagnosticCollector, FileCodeGenerator, MemoryCodeGenerator, ProcessOutcome, ProxyProcessor,
};
use std::path::PathBuf;
use tracing::debug;

use super::{load_config, scan_sources, source_dirs};
use crate::display::print_diagnostics;

#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub source_dirs: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub stdout: bool,
    pub allow_errors: bool,
}

pub fn generate_command(options: GenerateOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let dirs = source_dirs(&options.source_dirs, &config);
    debug!("Generating from {:?}", dirs);
    let table = scan_sources(&dirs)?;

    let processor = ProxyProcessor::new(config);
    let mut diagnostics = DiagnosticCollector::new();

    let outcome = if options.stdout {
        let mut codegen = MemoryCodeGenerator::new();
        let outcome = processor.process(&table, &mut codegen, &mut diagnostics);
        for text in codegen.files().values() {
            print!("{text}");
        }
        outcome
    } else {
        let out_dir = options
            .out_dir
            .or_else(|| std::env::var_os("OUT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("target").join("proxygen"));
        let mut codegen = FileCodeGenerator::new(out_dir);
        let outcome = processor.process(&table, &mut codegen, &mut diagnostics);
        for path in codegen.created_files() {
            eprintln!("✅ Wrote {}", path.display());
        }
        outcome
    };

    print_diagnostics(diagnostics.diagnostics());
    print_summary(&outcome);

    if diagnostics.has_errors() && !options.allow_errors {
        bail!(
            "{} declaration(s) were rejected; see the errors above",
            diagnostics.error_count()
        );
    }
    Ok(())
}

fn print_summary(outcome: &ProcessOutcome) {
    if !outcome.file_written {
        eprintln!("ℹ️  No marked declarations found; nothing generated");
        return;
    }
    eprintln!("📦 {} proxies generated", outcome.registered.len());
    for entry in &outcome.registered {
        eprintln!("   {} -> {}", entry.interface, entry.class_name);
    }
    for function in &outcome.deferred {
        eprintln!("⏳ {function}: signature mentions types that are not in scope");
    }
}
