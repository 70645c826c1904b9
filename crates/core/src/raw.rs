//! Raw model produced by pass 1 and consumed by passes 2-4.
//!
//! Raw DTOs are permissive: required fields may hold placeholders, and the
//! "exactly one of" pairs are two independent options. Pass 3 turns them
//! into the strict canonical types.

use crate::ident::TypeRef;
use crate::provenance::{ProvenanceOrigin, ProvenanceStack};

/// Prefix shared by every placeholder value.
pub const PLACEHOLDER_PREFIX: char = '<';

pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(PLACEHOLDER_PREFIX)
}

pub fn missing_placeholder(key: &str) -> String {
    format!("<missing.{}>", key)
}

pub fn invalid_placeholder(kind: &str) -> String {
    format!("<invalid.{}>", kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Valid,
    /// Present but failed the grammar; the authored value is kept.
    Malformed,
    /// Absent, null or not a scalar; the value is a placeholder.
    Missing,
}

/// A scalar field together with where it was authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScalar {
    pub value: String,
    pub origin: ProvenanceOrigin,
    pub status: FieldStatus,
}

impl RawScalar {
    pub fn is_valid(&self) -> bool {
        self.status == FieldStatus::Valid
    }
}

/// A type token and, when it parsed, its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTypeRef {
    pub text: RawScalar,
    pub parsed: Option<TypeRef>,
}

impl RawTypeRef {
    /// The parsed descriptor, or a plain reference to the authored text.
    pub fn resolved(&self) -> TypeRef {
        self.parsed
            .clone()
            .unwrap_or_else(|| TypeRef::named(self.text.value.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct RawModel {
    pub source: String,
    pub code_gen: RawCodeGen,
    pub namespaces: Vec<RawNamespace>,
    pub named_instances: Vec<RawNamedInstance>,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawCodeGen {
    pub registry_class_name: RawScalar,
    pub generated_code_path: RawScalar,
    pub namespace_name: RawScalar,
    pub initializer_name: RawScalar,
    pub package_references: Vec<RawScalar>,
    /// True when the `codeGen` block was absent or not a mapping.
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawNamespace {
    pub name: RawScalar,
    pub interfaces: Vec<RawInterface>,
    pub classes: Vec<RawClass>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawInterface {
    pub name: RawScalar,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawClass {
    pub name: RawScalar,
    pub qualified_interface: Option<RawTypeRef>,
    /// `None` when the key is absent; `Some(vec![])` for an explicit empty list.
    pub initializer_parameters: Option<Vec<RawParameter>>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawParameter {
    pub name: RawScalar,
    pub class_ref: Option<RawTypeRef>,
    pub interface_ref: Option<RawTypeRef>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawNamedInstance {
    pub name: RawScalar,
    pub class_ref: RawTypeRef,
    pub interface_ref: Option<RawTypeRef>,
    pub assignments: Option<Vec<RawAssignment>>,
    pub elements: Option<Vec<RawElement>>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawAssignment {
    pub parameter_name: RawScalar,
    pub value: Option<RawScalar>,
    pub instance_ref: Option<RawScalar>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct RawElement {
    pub value: Option<RawScalar>,
    pub instance_ref: Option<RawScalar>,
    pub placeholder: bool,
    pub prov: ProvenanceStack,
}
