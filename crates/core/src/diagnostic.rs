//! Diagnostic taxonomy, severity table and the per-run accumulator.

use crate::provenance::{ProvenanceOrigin, ProvenanceStack};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DiagnosticCode {
    // Fatal root conditions
    EmptyDocument,
    DocumentParseFailure,
    RootNotMapping,
    // Pass 1: syntactic extraction
    InvalidNode,
    ExpectedSequence,
    ExpectedScalar,
    UnknownKey,
    MissingRequiredKey,
    EmptyValue,
    InvalidIdentifier,
    InvalidQualifiedName,
    InvalidTypeReference,
    UnsupportedNullableElementArray,
    ParameterClassNotPrimitive,
    DuplicatePackageReference,
    RedundantEmptyList,
    // Pass 3: per-entity transforms
    ClassNamingConvention,
    InterfaceNamingConvention,
    EmptyNamespace,
    ParameterBothClassAndInterface,
    ParameterMissingType,
    DuplicateParameterName,
    AssignmentBothValueAndReference,
    AssignmentMissingValue,
    ElementBothValueAndReference,
    ElementMissingValue,
    NamedInstanceBothAssignmentsAndElements,
    ElementsRequireArrayType,
    // Pass 4: whole-model checks
    DuplicateTypeIdentifier,
    DuplicateNamedInstance,
    DuplicateInvokerKey,
    InvalidInvokerKey,
    DependencyOrderViolation,
    NamedInstanceMissing,
    NamedInstanceNotExposingInterface,
    LiteralForInterfaceParameter,
    UnknownInitializerParameter,
    DuplicateAssignment,
    UnassignedParameter,
    UnresolvedClass,
    UnresolvedInterface,
    InterfaceMismatch,
}

impl DiagnosticCode {
    pub const ALL: &'static [DiagnosticCode] = &[
        DiagnosticCode::EmptyDocument,
        DiagnosticCode::DocumentParseFailure,
        DiagnosticCode::RootNotMapping,
        DiagnosticCode::InvalidNode,
        DiagnosticCode::ExpectedSequence,
        DiagnosticCode::ExpectedScalar,
        DiagnosticCode::UnknownKey,
        DiagnosticCode::MissingRequiredKey,
        DiagnosticCode::EmptyValue,
        DiagnosticCode::InvalidIdentifier,
        DiagnosticCode::InvalidQualifiedName,
        DiagnosticCode::InvalidTypeReference,
        DiagnosticCode::UnsupportedNullableElementArray,
        DiagnosticCode::ParameterClassNotPrimitive,
        DiagnosticCode::DuplicatePackageReference,
        DiagnosticCode::RedundantEmptyList,
        DiagnosticCode::ClassNamingConvention,
        DiagnosticCode::InterfaceNamingConvention,
        DiagnosticCode::EmptyNamespace,
        DiagnosticCode::ParameterBothClassAndInterface,
        DiagnosticCode::ParameterMissingType,
        DiagnosticCode::DuplicateParameterName,
        DiagnosticCode::AssignmentBothValueAndReference,
        DiagnosticCode::AssignmentMissingValue,
        DiagnosticCode::ElementBothValueAndReference,
        DiagnosticCode::ElementMissingValue,
        DiagnosticCode::NamedInstanceBothAssignmentsAndElements,
        DiagnosticCode::ElementsRequireArrayType,
        DiagnosticCode::DuplicateTypeIdentifier,
        DiagnosticCode::DuplicateNamedInstance,
        DiagnosticCode::DuplicateInvokerKey,
        DiagnosticCode::InvalidInvokerKey,
        DiagnosticCode::DependencyOrderViolation,
        DiagnosticCode::NamedInstanceMissing,
        DiagnosticCode::NamedInstanceNotExposingInterface,
        DiagnosticCode::LiteralForInterfaceParameter,
        DiagnosticCode::UnknownInitializerParameter,
        DiagnosticCode::DuplicateAssignment,
        DiagnosticCode::UnassignedParameter,
        DiagnosticCode::UnresolvedClass,
        DiagnosticCode::UnresolvedInterface,
        DiagnosticCode::InterfaceMismatch,
    ];

    pub fn as_str(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            EmptyDocument => "EmptyDocument",
            DocumentParseFailure => "DocumentParseFailure",
            RootNotMapping => "RootNotMapping",
            InvalidNode => "InvalidNode",
            ExpectedSequence => "ExpectedSequence",
            ExpectedScalar => "ExpectedScalar",
            UnknownKey => "UnknownKey",
            MissingRequiredKey => "MissingRequiredKey",
            EmptyValue => "EmptyValue",
            InvalidIdentifier => "InvalidIdentifier",
            InvalidQualifiedName => "InvalidQualifiedName",
            InvalidTypeReference => "InvalidTypeReference",
            UnsupportedNullableElementArray => "UnsupportedNullableElementArray",
            ParameterClassNotPrimitive => "ParameterClassNotPrimitive",
            DuplicatePackageReference => "DuplicatePackageReference",
            RedundantEmptyList => "RedundantEmptyList",
            ClassNamingConvention => "ClassNamingConvention",
            InterfaceNamingConvention => "InterfaceNamingConvention",
            EmptyNamespace => "EmptyNamespace",
            ParameterBothClassAndInterface => "ParameterBothClassAndInterface",
            ParameterMissingType => "ParameterMissingType",
            DuplicateParameterName => "DuplicateParameterName",
            AssignmentBothValueAndReference => "AssignmentBothValueAndReference",
            AssignmentMissingValue => "AssignmentMissingValue",
            ElementBothValueAndReference => "ElementBothValueAndReference",
            ElementMissingValue => "ElementMissingValue",
            NamedInstanceBothAssignmentsAndElements => "NamedInstanceBothAssignmentsAndElements",
            ElementsRequireArrayType => "ElementsRequireArrayType",
            DuplicateTypeIdentifier => "DuplicateTypeIdentifier",
            DuplicateNamedInstance => "DuplicateNamedInstance",
            DuplicateInvokerKey => "DuplicateInvokerKey",
            InvalidInvokerKey => "InvalidInvokerKey",
            DependencyOrderViolation => "DependencyOrderViolation",
            NamedInstanceMissing => "NamedInstanceMissing",
            NamedInstanceNotExposingInterface => "NamedInstanceNotExposingInterface",
            LiteralForInterfaceParameter => "LiteralForInterfaceParameter",
            UnknownInitializerParameter => "UnknownInitializerParameter",
            DuplicateAssignment => "DuplicateAssignment",
            UnassignedParameter => "UnassignedParameter",
            UnresolvedClass => "UnresolvedClass",
            UnresolvedInterface => "UnresolvedInterface",
            InterfaceMismatch => "InterfaceMismatch",
        }
    }

    pub fn severity(self) -> Severity {
        Severity::of(self)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

// Codes not listed here are errors.
static SEVERITY_TABLE: &[(DiagnosticCode, Severity)] = &[
    (DiagnosticCode::EmptyDocument, Severity::Error),
    (DiagnosticCode::DocumentParseFailure, Severity::Error),
    (DiagnosticCode::RootNotMapping, Severity::Error),
    (DiagnosticCode::DuplicatePackageReference, Severity::Warning),
    (DiagnosticCode::RedundantEmptyList, Severity::Warning),
    (DiagnosticCode::ClassNamingConvention, Severity::Warning),
    (DiagnosticCode::InterfaceNamingConvention, Severity::Warning),
    (DiagnosticCode::UnassignedParameter, Severity::Warning),
    (DiagnosticCode::EmptyNamespace, Severity::Info),
];

impl Severity {
    pub fn of(code: DiagnosticCode) -> Severity {
        SEVERITY_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, s)| *s)
            .unwrap_or(Severity::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding. Displays as `{Code}: {Message} (at {Location})`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub location: String,
    /// Zero-based line of the origin, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Diagnostic {
    /// Location comes from `provenance` when given, otherwise from
    /// `fallback_location`.
    pub fn new(
        code: DiagnosticCode,
        message: impl Into<String>,
        provenance: Option<&ProvenanceStack>,
        fallback_location: &str,
    ) -> Self {
        let (location, line) = match provenance {
            Some(stack) => (stack.location(), Some(stack.origin().line)),
            None => (fallback_location.to_owned(), None),
        };
        Diagnostic {
            code,
            severity: Severity::of(code),
            message: message.into(),
            location,
            line,
        }
    }

    pub fn at(
        code: DiagnosticCode,
        message: impl Into<String>,
        provenance: &ProvenanceStack,
    ) -> Self {
        Diagnostic::new(code, message, Some(provenance), "")
    }

    pub fn at_origin(
        code: DiagnosticCode,
        message: impl Into<String>,
        origin: &ProvenanceOrigin,
    ) -> Self {
        Diagnostic {
            code,
            severity: Severity::of(code),
            message: message.into(),
            location: origin.location(),
            line: Some(origin.line),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (at {})", self.code, self.message, self.location)
    }
}

/// Accumulates diagnostics for a single pipeline run, in emission order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

pub fn summarize(diagnostics: &[Diagnostic]) -> Summary {
    let mut summary = Summary::default();
    for d in diagnostics {
        match d.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.infos += 1,
        }
    }
    summary
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
