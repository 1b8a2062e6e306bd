//! The generation pass: discovery, classification, emission and registry

use crate::{
    classify::Classifier,
    config::Config,
    diagnostics::{Diagnostic, DiagnosticSink},
    emit::ProxyEmitter,
    error::{Error, Result},
    host::SymbolHost,
    output::CodeGenerator,
    registry::RegistryBuilder,
    resolve::TypeResolver,
    types::ProxyRegistryEntry,
};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// First line of every generated file
pub const GENERATED_HEADER: &str =
    "// @generated by proxygen. DO NOT EDIT: this file is rebuilt on every build.";

/// Completion report of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    /// Proxies written to the output file, in emission order
    pub registered: Vec<ProxyRegistryEntry>,
    /// Dispatch functions whose signature mentions types that do not resolve
    pub deferred: Vec<String>,
    /// Whether an output file was created
    pub file_written: bool,
}

pub struct ProxyProcessor {
    config: Config,
    emitter: ProxyEmitter,
}

impl ProxyProcessor {
    pub fn new(config: Config) -> Self {
        let emitter = ProxyEmitter::new(config.runtime_path.clone());
        Self { config, emitter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one pass over `host`, writing at most one file through `codegen`.
    ///
    /// Per-declaration problems are reported as errors and leave the rest of
    /// the output intact. Anything else, including a panic, is logged,
    /// reported as a warning and yields an empty outcome.
    pub fn process<H: SymbolHost + ?Sized>(
        &self,
        host: &H,
        codegen: &mut dyn CodeGenerator,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> ProcessOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(host, &mut *codegen, &mut *diagnostics)
        }));

        let message = match result {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        tracing::error!("Proxy generation aborted: {}", message);
        diagnostics.report(Diagnostic::warning(
            format!("proxy generation aborted: {message}"),
            None,
        ));
        ProcessOutcome::default()
    }

    fn run<H: SymbolHost + ?Sized>(
        &self,
        host: &H,
        codegen: &mut dyn CodeGenerator,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<ProcessOutcome> {
        let classifier = Classifier::new(host, &self.config.markers);
        if !classifier.has_marked_declarations() {
            tracing::info!("No marked declarations; nothing to generate");
            return Ok(ProcessOutcome::default());
        }

        let classified = classifier.classify_all();
        tracing::info!("Processing {} marked declarations", classified.len());

        let mut sink = codegen.create_new_file(&self.config.package, &self.config.file_name)?;
        sink.append(GENERATED_HEADER)?;
        sink.append("\n\n")?;

        let mut registry = RegistryBuilder::new();
        for item in classified {
            let request = match item.outcome {
                Ok(request) => request,
                Err(err) if err.is_local() => {
                    tracing::warn!("Skipping `{}`: {}", item.declaration, err);
                    diagnostics.report(Diagnostic::error(err.to_string(), Some(item.declaration)));
                    continue;
                }
                Err(err) => return Err(err),
            };

            let emitted = self.emitter.emit(&request);
            if let Err(err) = registry.register(emitted.registry_entry()) {
                tracing::warn!("Discarding proxy for `{}`: {}", item.declaration, err);
                diagnostics.report(Diagnostic::error(err.to_string(), Some(item.declaration)));
                continue;
            }
            sink.append(&emitted.text)?;
            sink.append("\n")?;
        }

        sink.append(&registry.emit(&self.config.runtime_path))?;
        sink.finish()?;

        let deferred = self.deferred_functions(host, &classifier);
        let registered = registry.into_entries();
        tracing::info!(
            "Generated {} proxies ({} deferred dispatch functions)",
            registered.len(),
            deferred.len()
        );
        Ok(ProcessOutcome {
            registered,
            deferred,
            file_written: true,
        })
    }

    fn deferred_functions<H: SymbolHost + ?Sized>(
        &self,
        host: &H,
        classifier: &Classifier<'_, H>,
    ) -> Vec<String> {
        let resolver = TypeResolver::new(host);
        classifier
            .dispatch_functions()
            .into_iter()
            .filter_map(|id| host.declaration(id))
            .filter(|decl| {
                decl.as_function().is_some_and(|sig| {
                    sig.types().any(|ty| !resolver.validate(decl.scope, ty))
                })
            })
            .map(|decl| decl.qualified_name())
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        Error::InternalFault("unknown panic".to_string()).to_string()
    }
}
