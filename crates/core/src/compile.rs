//! Pipeline orchestrator: node tree -> canonical model.
//!
//! This is a thin driver that calls each pass in order. Expected validation
//! failures travel as diagnostics on the returned [`Model`]; only
//! environment failures in [`compile_source`] are `Err`.

use crate::canonical::{CodeGenConfig, Model};
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::CompileError;
use crate::node::{Node, SyntaxError};
use crate::pass1_extract;
use crate::pass2_index;
use crate::pass3_transform;
use crate::pass4_validate;
use crate::provenance::{ProvenanceContext, ProvenanceOrigin, Stage, ROOT_PATH};
use crate::raw::missing_placeholder;
use crate::source::{SourceFormat, SourceProvider};
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

/// Provenance tool identifier used when none is configured.
pub const DEFAULT_TOOL: &str = concat!("wiregen/", env!("CARGO_PKG_VERSION"));

/// Where a run takes its single provenance timestamp from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl Clock {
    pub fn now(&self) -> OffsetDateTime {
        match self {
            Clock::System => OffsetDateTime::now_utc(),
            Clock::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Tool identifier stamped on every provenance entry.
    pub tool: String,
    pub clock: Clock,
    /// Overrides the source identifier [`compile_source`] derives from the path.
    pub source_id: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            tool: DEFAULT_TOOL.to_owned(),
            clock: Clock::System,
            source_id: None,
        }
    }
}

impl CompileOptions {
    /// Default options with a fixed clock, for reproducible output.
    pub fn fixed(at: OffsetDateTime) -> Self {
        CompileOptions {
            clock: Clock::Fixed(at),
            ..CompileOptions::default()
        }
    }
}

/// Compile an already-parsed node tree.
#[instrument(skip_all, fields(source = %source))]
pub fn compile_node(root: &Node, source: &str, options: &CompileOptions) -> Model {
    let extract_ctx = ProvenanceContext::new(Stage::Extract, &options.tool, options.clock.now());
    let mut diags = Diagnostics::new();

    // Pass 1: syntactic extraction
    let raw = match pass1_extract::extract(root, source, &extract_ctx, &mut diags) {
        Ok(raw) => raw,
        Err(fatal) => {
            warn!(code = %fatal.code, "document rejected: {}", fatal.message);
            return fatal_model(source, fatal, &extract_ctx);
        }
    };
    debug!(
        namespaces = raw.namespaces.len(),
        named_instances = raw.named_instances.len(),
        diagnostics = diags.len(),
        "pass 1 complete"
    );

    // Pass 2: declaration index
    let index = pass2_index::build_index(&raw);
    debug!(
        classes = index.classes.len(),
        interfaces = index.interfaces.len(),
        instances = index.instances.len(),
        "pass 2 complete"
    );

    // Pass 3: canonical transformation
    let transform_ctx = extract_ctx.for_stage(Stage::Transform);
    let mut model = pass3_transform::transform(&raw, &transform_ctx, &mut diags);
    debug!(diagnostics = diags.len(), "pass 3 complete");

    // Pass 4: whole-model validation
    pass4_validate::validate(&model, &raw, &index, &mut diags);
    model.diagnostics = diags.into_vec();

    let summary = model.summary();
    debug!(
        errors = summary.errors,
        warnings = summary.warnings,
        infos = summary.infos,
        "pass 4 complete"
    );
    model
}

/// Compile YAML text.
pub fn compile_str(text: &str, source: &str, options: &CompileOptions) -> Model {
    compile_text(text, SourceFormat::Yaml, source, options)
}

/// Compile text in the given notation. Empty and unparseable input produce a
/// fatal model carrying exactly one Error.
pub fn compile_text(
    text: &str,
    format: SourceFormat,
    source: &str,
    options: &CompileOptions,
) -> Model {
    let ctx = ProvenanceContext::new(Stage::Extract, &options.tool, options.clock.now());
    let root_origin = ProvenanceOrigin::new(source, 0, None, ROOT_PATH);

    if is_blank(text) {
        warn!(source = %source, "document is empty");
        let fatal = Diagnostic::at_origin(
            DiagnosticCode::EmptyDocument,
            "document contains no declarations",
            &root_origin,
        );
        return fatal_model(source, fatal, &ctx);
    }

    let parsed = match format {
        SourceFormat::Yaml => Node::from_yaml_str(text),
        SourceFormat::Json => serde_json::from_str::<serde_json::Value>(text)
            .map(|v| Node::from_json(&v))
            .map_err(|e| SyntaxError::Malformed(e.to_string())),
    };
    match parsed {
        Ok(root) => compile_node(&root, source, options),
        Err(SyntaxError::RootNotMapping(position)) => {
            warn!(source = %source, "document root is not a mapping");
            let origin = ProvenanceOrigin::new(source, position.line, position.column, ROOT_PATH);
            let fatal = Diagnostic::at_origin(
                DiagnosticCode::RootNotMapping,
                "document root must be a mapping",
                &origin,
            );
            fatal_model(source, fatal, &ctx)
        }
        Err(SyntaxError::Malformed(message)) => {
            warn!(source = %source, "document could not be parsed: {}", message);
            let fatal = Diagnostic::at_origin(
                DiagnosticCode::DocumentParseFailure,
                format!("document could not be parsed: {}", message),
                &root_origin,
            );
            fatal_model(source, fatal, &ctx)
        }
    }
}

/// Read `path` through `provider` and compile it. The notation follows the
/// file extension.
pub fn compile_source(
    provider: &dyn SourceProvider,
    path: &Path,
    options: &CompileOptions,
) -> Result<Model, CompileError> {
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| CompileError::UnsupportedFormat(path.to_path_buf()))?;
    let text = provider.read_source(path).map_err(|source| CompileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source_id = match &options.source_id {
        Some(id) => id.clone(),
        None => path.display().to_string(),
    };
    Ok(compile_text(&text, format, &source_id, options))
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// The near-empty model returned for a fatal root condition.
fn fatal_model(source: &str, fatal: Diagnostic, ctx: &ProvenanceContext) -> Model {
    let root = ctx.make(ProvenanceOrigin::new(source, 0, None, ROOT_PATH));
    Model {
        source: source.to_owned(),
        code_gen: CodeGenConfig {
            registry_class_name: missing_placeholder("registryClassName"),
            generated_code_path: missing_placeholder("generatedCodePath"),
            namespace_name: missing_placeholder("namespaceName"),
            initializer_name: missing_placeholder("initializerName"),
            package_references: Vec::new(),
            provenance: root.clone(),
        },
        namespaces: Vec::new(),
        named_instances: Vec::new(),
        provenance: root,
        diagnostics: vec![fatal],
    }
}
