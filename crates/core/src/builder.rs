//! Build-script entry point
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     proxygen_core::Builder::new().source_dir("src").generate().unwrap();
//! }
//! ```

use crate::{
    config::Config,
    diagnostics::{Diagnostic, DiagnosticCollector},
    error::{Error, Result},
    output::{CodeGenerator, FileCodeGenerator, OutputSink},
    parser::scan_into,
    processor::{GENERATED_HEADER, ProcessOutcome, ProxyProcessor},
    registry::RegistryBuilder,
    host::SymbolTable,
};
use std::path::{Path, PathBuf};

/// Result of [`Builder::generate`]
#[derive(Debug)]
pub struct GenerationReport {
    pub outcome: ProcessOutcome,
    pub diagnostics: Vec<Diagnostic>,
    /// The generated file, present whenever generation ran to completion
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Builder {
    config: Config,
    source_dirs: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    emit_cargo_metadata: bool,
    fail_on_error: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source_dirs: Vec::new(),
            out_dir: None,
            emit_cargo_metadata: true,
            fail_on_error: true,
        }
    }

    /// Start from the `proxygen.json` found at or above `start`, or the
    /// defaults when there is none
    pub fn discover(start: &Path) -> Result<Self> {
        let config = match Config::find_config_file(start) {
            Some(path) => {
                tracing::debug!("Using config {}", path.display());
                Config::load_from_file(&path)?
            }
            None => Config::default(),
        };
        Ok(Self::new().with_config(config))
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a directory to scan. Overrides `source_dirs` from the config.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }

    /// Where the generated file goes; `$OUT_DIR` when unset
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Print `cargo:rerun-if-changed` and `cargo:warning` lines
    pub fn emit_cargo_metadata(mut self, enabled: bool) -> Self {
        self.emit_cargo_metadata = enabled;
        self
    }

    /// Turn error diagnostics into [`Error::GenerationFailed`]
    pub fn fail_on_error(mut self, enabled: bool) -> Self {
        self.fail_on_error = enabled;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        let out_dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or_else(|| {
                    Error::ConfigError(
                        "OUT_DIR is not set; call `out_dir` when not running in a build script"
                            .to_string(),
                    )
                })?,
        };

        let source_dirs = self.resolved_source_dirs();
        let mut table = SymbolTable::new();
        for dir in &source_dirs {
            if self.emit_cargo_metadata {
                println!("cargo:rerun-if-changed={}", dir.display());
            }
            scan_into(dir, &mut table)?;
        }
        tracing::info!(
            "Scanned {} declarations from {} directories",
            table.len(),
            source_dirs.len()
        );

        let mut codegen = FileCodeGenerator::new(&out_dir);
        let mut collector = DiagnosticCollector::new();
        let outcome =
            ProxyProcessor::new(self.config.clone()).process(&table, &mut codegen, &mut collector);

        // `include!` needs the file even when nothing is marked
        let output_path = if outcome.file_written {
            codegen.created_files().first().cloned()
        } else if collector.diagnostics().is_empty() {
            Some(self.write_empty_registry(&mut codegen)?)
        } else {
            None
        };

        if self.emit_cargo_metadata {
            for diagnostic in collector.diagnostics() {
                println!("cargo:warning={}", diagnostic.to_string().replace('\n', " "));
            }
        }

        if self.fail_on_error && collector.has_errors() {
            let messages: Vec<String> = collector.errors().map(ToString::to_string).collect();
            return Err(Error::GenerationFailed {
                count: messages.len(),
                messages: messages.join("\n"),
            });
        }

        Ok(GenerationReport {
            outcome,
            diagnostics: collector.into_diagnostics(),
            output_path,
        })
    }

    fn resolved_source_dirs(&self) -> Vec<PathBuf> {
        if !self.source_dirs.is_empty() {
            self.source_dirs.clone()
        } else if !self.config.source_dirs.is_empty() {
            self.config.source_dirs.clone()
        } else {
            vec![PathBuf::from("src")]
        }
    }

    fn write_empty_registry(&self, codegen: &mut FileCodeGenerator) -> Result<PathBuf> {
        let path = codegen.path_for(&self.config.package, &self.config.file_name);
        let mut sink: Box<dyn OutputSink + '_> =
            codegen.create_new_file(&self.config.package, &self.config.file_name)?;
        sink.append(GENERATED_HEADER)?;
        sink.append("\n\n")?;
        sink.append(&RegistryBuilder::new().emit(&self.config.runtime_path))?;
        sink.finish()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DISPATCH: &str = "use std::any::Any;\nuse proxygen_runtime::MethodCall;\n";

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (name, contents) in files {
            let path = temp.path().join("src").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        temp
    }

    fn builder(temp: &TempDir) -> Builder {
        Builder::new()
            .source_dir(temp.path().join("src"))
            .out_dir(temp.path().join("out"))
            .emit_cargo_metadata(false)
    }

    #[test]
    fn test_generates_into_out_dir() {
        let lib = format!(
            "{DISPATCH}pub mod shapes;\n\
             #[proxy_for(shapes::Vector)]\n\
             pub fn vector_proxy(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {{ todo!() }}\n"
        );
        let temp = project(&[
            ("lib.rs", &lib),
            ("shapes.rs", "pub trait Vector { fn get_x(&self) -> f64; }"),
        ]);

        let report = builder(&temp).generate().unwrap();

        let path = report.output_path.unwrap();
        assert_eq!(path, temp.path().join("out").join("generated_proxies.rs"));
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("impl crate::shapes::Vector for ProxyForVector {"));
        assert!(text.contains("crate::vector_proxy(&CALL, Vec::new())"));
        assert_eq!(report.outcome.registered.len(), 1);
    }

    #[test]
    fn test_unmarked_crate_still_gets_a_registry() {
        let temp = project(&[("lib.rs", "pub trait Plain {}")]);
        let report = builder(&temp).generate().unwrap();

        let text = fs::read_to_string(report.output_path.unwrap()).unwrap();
        assert!(text.starts_with(GENERATED_HEADER));
        assert!(text.contains("pub enum ProxyInterface {\n}"));
        assert!(!report.outcome.file_written);
    }

    #[test]
    fn test_errors_fail_generation_unless_disabled() {
        let temp = project(&[(
            "lib.rs",
            "pub struct NotATrait;\n#[with_proxy(Missing)]\npub trait Target {}\n",
        )]);

        let err = builder(&temp).generate().unwrap_err();
        assert!(matches!(err, Error::GenerationFailed { count: 1, .. }), "{err}");

        let report = builder(&temp).fail_on_error(false).generate().unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.output_path.is_some());
    }

    #[test]
    fn test_sources_from_config_and_discovery() {
        let temp = project(&[("lib.rs", "pub trait Plain {}")]);
        let config = Config {
            file_name: "proxies".to_string(),
            package: "gen".to_string(),
            source_dirs: vec![temp.path().join("src")],
            ..Config::default()
        };
        config
            .save_to_file(&temp.path().join(crate::config::CONFIG_FILE_NAME))
            .unwrap();

        let report = Builder::discover(&temp.path().join("src"))
            .unwrap()
            .out_dir(temp.path().join("out"))
            .emit_cargo_metadata(false)
            .generate()
            .unwrap();
        assert_eq!(
            report.output_path.unwrap(),
            temp.path().join("out").join("gen").join("proxies.rs")
        );
    }

    #[test]
    fn test_missing_source_dir_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let err = Builder::new()
            .source_dir(temp.path().join("nope"))
            .out_dir(temp.path())
            .emit_cargo_metadata(false)
            .generate()
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
