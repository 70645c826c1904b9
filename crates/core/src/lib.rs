//! wiregen-core: dependency-wiring specification compiler.
//!
//! Compiles a YAML-shaped wiring document into a validated canonical model
//! that a downstream code generator renders.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`compile_str()`], [`compile_text()`], [`compile_node()`],
//!   [`compile_source()`] -- run the full pipeline
//! - [`CompileOptions`], [`Clock`] -- tool identifier and provenance clock
//! - [`Model`] and the canonical entity types
//! - [`Diagnostic`], [`DiagnosticCode`], [`Severity`] -- the diagnostic ledger
//! - [`CompileError`] -- source read and format errors
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

/// Version of the interchange document written by [`pass5_serialize`].
pub const WIRING_MODEL_VERSION: &str = "1.0.0";

pub mod canonical;
pub mod compile;
pub mod diagnostic;
pub mod error;
pub mod ident;
pub mod node;
pub mod pass1_extract;
pub mod pass2_index;
pub mod pass3_transform;
pub mod pass4_validate;
pub mod pass5_serialize;
pub mod provenance;
pub mod raw;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use canonical::{
    Assignment, Class, CodeGenConfig, Element, Initialization, Interface, Model, NamedInstance,
    Namespace, Parameter, ParameterType, Wiring,
};
pub use compile::{Clock, CompileOptions};
pub use diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Severity, Summary};
pub use error::CompileError;
pub use ident::{TypeRef, TypeRefError};
pub use node::Node;
pub use pass2_index::Index;
pub use provenance::{ProvenanceOrigin, ProvenanceStack, Stage};
pub use source::{FileSystemProvider, InMemoryProvider, SourceFormat, SourceProvider};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile_node, compile_source, compile_str, compile_text};
pub use pass1_extract::extract;
pub use pass2_index::build_index;
pub use pass3_transform::transform;
pub use pass4_validate::validate;
pub use pass5_serialize::serialize;
