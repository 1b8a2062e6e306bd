use proxygen_core::{Diagnostic, InterfaceShape, MarkerKind, Severity};

pub fn marker_label(marker: MarkerKind) -> &'static str {
    match marker {
        MarkerKind::DispatchFunction => "dispatch function",
        MarkerKind::HandlerInterface => "handler interface",
    }
}

/// "2 properties (1 mutable), 3 methods across 2 traits"
pub fn member_summary(shape: &InterfaceShape) -> String {
    let mutable = shape.properties.iter().filter(|p| p.mutable).count();
    format!(
        "{} properties ({} mutable), {} methods across {} traits",
        shape.properties.len(),
        mutable,
        shape.methods.len(),
        shape.traits.len()
    )
}

/// Diagnostics go to stderr so `--stdout` output stays clean
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let icon = match diagnostic.severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        eprintln!("{icon} {diagnostic}");
    }
}
