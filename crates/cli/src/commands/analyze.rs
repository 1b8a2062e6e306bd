use anyhow::Result;
use proxygen_core::{Classified, Classifier, GenerationRequest, SymbolTable};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{load_config, scan_sources, source_dirs};
use crate::display::{marker_label, member_summary};

/// One marked declaration and what classifying it produced
#[derive(Debug, Serialize)]
pub struct AnalysisEntry {
    pub declaration: String,
    pub marker: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<GenerationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Classified> for AnalysisEntry {
    fn from(classified: Classified) -> Self {
        let (request, error) = match classified.outcome {
            Ok(request) => (Some(request), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            declaration: classified.declaration,
            marker: marker_label(classified.marker),
            request,
            error,
        }
    }
}

pub fn analyze(table: &SymbolTable, config: &proxygen_core::Config) -> Vec<AnalysisEntry> {
    Classifier::new(table, &config.markers)
        .classify_all()
        .into_iter()
        .map(AnalysisEntry::from)
        .collect()
}

pub fn analyze_command(src: &[PathBuf], config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let dirs = source_dirs(src, &config);
    debug!("Analyzing {:?}", dirs);
    let table = scan_sources(&dirs)?;
    let entries = analyze(&table, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let shown: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    println!("🔍 Analyzing: {}", shown.join(", "));
    println!("{}", "=".repeat(80));

    if entries.is_empty() {
        println!(
            "No declarations marked with #[{}] or #[{}]",
            config.markers.dispatch_function, config.markers.handler_interface
        );
        return Ok(());
    }

    for entry in &entries {
        match (&entry.request, &entry.error) {
            (Some(request), _) => {
                println!("✅ {} ({})", entry.declaration, entry.marker);
                println!(
                    "   {} implements {}",
                    request.class_name, request.shape.qualified_name
                );
                println!("   🎯 Dispatch: {}", request.target.describe());
                println!("   📋 {}", member_summary(&request.shape));
            }
            (None, Some(error)) => {
                println!("❌ {} ({})", entry.declaration, entry.marker);
                println!("   {error}");
            }
            (None, None) => {}
        }
    }
    Ok(())
}
