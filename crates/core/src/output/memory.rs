use super::{CodeGenerator, OutputSink, package_segments};
use crate::error::Result;
use std::collections::BTreeMap;

/// Keeps finished files in memory, keyed by `dir/.../name.rs`
#[derive(Debug, Default, Clone)]
pub struct MemoryCodeGenerator {
    files: BTreeMap<String, String>,
}

impl MemoryCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn file(&self, key: &str) -> Option<&str> {
        self.files.get(key).map(String::as_str)
    }

    pub fn key_for(package: &str, file_name: &str) -> String {
        let mut segments = package_segments(package);
        let file = format!("{file_name}.rs");
        segments.push(&file);
        segments.join("/")
    }
}

impl CodeGenerator for MemoryCodeGenerator {
    fn create_new_file(
        &mut self,
        package: &str,
        file_name: &str,
    ) -> Result<Box<dyn OutputSink + '_>> {
        Ok(Box::new(MemorySink {
            key: Self::key_for(package, file_name),
            buffer: String::new(),
            files: &mut self.files,
        }))
    }
}

struct MemorySink<'a> {
    key: String,
    buffer: String,
    files: &'a mut BTreeMap<String, String>,
}

impl OutputSink for MemorySink<'_> {
    fn append(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let sink = *self;
        sink.files.insert(sink.key, sink.buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfinished_files_are_not_visible() {
        let mut generator = MemoryCodeGenerator::new();
        {
            let mut sink = generator.create_new_file("", "dropped").unwrap();
            sink.append("lost").unwrap();
        }
        let mut sink = generator.create_new_file("gen", "kept").unwrap();
        sink.append("pub struct Kept;").unwrap();
        sink.finish().unwrap();

        assert_eq!(generator.files().len(), 1);
        assert_eq!(generator.file("gen/kept.rs"), Some("pub struct Kept;"));
        assert_eq!(MemoryCodeGenerator::key_for("", "x"), "x.rs");
    }
}
