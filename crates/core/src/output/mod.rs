//! Destinations for generated source files

pub mod file;
pub mod memory;

pub use file::FileCodeGenerator;
pub use memory::MemoryCodeGenerator;

use crate::error::Result;

/// Creates output files
pub trait CodeGenerator {
    /// Open `file_name` (without extension) inside `package`, a `.` or
    /// `::` separated list of directories. An empty package is the root.
    fn create_new_file(&mut self, package: &str, file_name: &str)
    -> Result<Box<dyn OutputSink + '_>>;
}

/// One file being written. Text is only guaranteed to be persisted once
/// [`finish`](OutputSink::finish) returns.
pub trait OutputSink {
    fn append(&mut self, text: &str) -> Result<()>;

    fn finish(self: Box<Self>) -> Result<()>;
}

/// Directory components of a package name
pub fn package_segments(package: &str) -> Vec<&str> {
    package
        .split(['.', ':'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_segments() {
        assert!(package_segments("").is_empty());
        assert_eq!(package_segments("gen.proxies"), vec!["gen", "proxies"]);
        assert_eq!(package_segments("gen::proxies"), vec!["gen", "proxies"]);
    }
}
