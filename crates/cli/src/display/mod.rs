pub mod formatter;

pub use formatter::{marker_label, member_summary, print_diagnostics};
