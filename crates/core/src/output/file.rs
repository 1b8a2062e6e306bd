use super::{CodeGenerator, OutputSink, package_segments};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes files below an output directory (`OUT_DIR` in build scripts)
#[derive(Debug, Clone)]
pub struct FileCodeGenerator {
    out_dir: PathBuf,
    created: Vec<PathBuf>,
}

impl FileCodeGenerator {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            created: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Paths of every file opened so far
    pub fn created_files(&self) -> &[PathBuf] {
        &self.created
    }

    pub fn path_for(&self, package: &str, file_name: &str) -> PathBuf {
        let mut path = self.out_dir.clone();
        path.extend(package_segments(package));
        path.join(format!("{file_name}.rs"))
    }
}

impl CodeGenerator for FileCodeGenerator {
    fn create_new_file(
        &mut self,
        package: &str,
        file_name: &str,
    ) -> Result<Box<dyn OutputSink + '_>> {
        let path = self.path_for(package, file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        tracing::debug!("Writing proxies to {}", path.display());
        self.created.push(path);
        Ok(Box::new(FileSink {
            writer: BufWriter::new(file),
        }))
    }
}

struct FileSink {
    writer: BufWriter<File>,
}

impl OutputSink for FileSink {
    fn append(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
