//! Pass 4: Whole-model validation -- checks that need every entity at once.
//!
//! Runs after all transforms, in a fixed order: collisions, invoker keys,
//! reference resolution, forward-reference ordering, wiring compatibility.
//! Raw DTOs are consulted alongside the canonical model so that fields pass 1
//! already rejected are skipped here.

mod collisions;
mod invoker;
mod ordering;
mod resolve;
mod wiring;

use crate::canonical::*;
use crate::diagnostic::Diagnostics;
use crate::ident;
use crate::pass2_index::Index;
use crate::raw::{RawModel, RawTypeRef};

pub fn validate(model: &Model, raw: &RawModel, index: &Index, diags: &mut Diagnostics) {
    let scope = Scope { model, raw, index };
    collisions::check_collisions(&scope, diags);
    invoker::check_invoker_keys(&scope, diags);
    resolve::check_references(&scope, diags);
    ordering::check_ordering(&scope, diags);
    wiring::check_wiring(&scope, diags);
}

/// Read-only view shared by the checks.
struct Scope<'m> {
    model: &'m Model,
    raw: &'m RawModel,
    index: &'m Index,
}

impl<'m> Scope<'m> {
    fn class(&self, qualified_name: &str) -> Option<&'m Class> {
        let (n, c) = *self.index.classes.get(qualified_name)?;
        self.model.namespaces.get(n)?.classes.get(c)
    }

    fn instance(&self, name: &str) -> Option<&'m NamedInstance> {
        let i = self.index.instance_position(name)?;
        self.model.named_instances.get(i)
    }

    /// The declared class behind named instance `i`, when its class reference
    /// is well formed and names a declared class.
    fn instance_class(&self, i: usize) -> Option<&'m Class> {
        let raw = self.raw.named_instances.get(i)?;
        let inst = self.model.named_instances.get(i)?;
        if !ref_ok(&raw.class_ref) || inst.class_type.is_primitive() {
            return None;
        }
        self.class(&inst.class_type.base)
    }

    /// The interface an instance can be wired as: its own declared
    /// interface, else the one its class exposes.
    fn exposed_interface(&self, inst: &'m NamedInstance) -> Option<&'m str> {
        if let Some(t) = &inst.interface_type {
            return Some(&t.base);
        }
        self.class(&inst.class_type.base)?
            .qualified_interface_name
            .as_deref()
    }
}

fn ref_ok(r: &RawTypeRef) -> bool {
    r.text.is_valid() && r.parsed.is_some()
}

/// Wiring targets that pass 1 rejected or filled with a placeholder are not
/// looked up again.
fn is_checkable_reference(name: &str) -> bool {
    ident::is_simple_identifier(name)
}

#[cfg(test)]
mod tests {
    use crate::compile::{compile_str, CompileOptions};
    use crate::diagnostic::{DiagnosticCode, Severity};
    use time::OffsetDateTime;

    fn codes(body: &str) -> Vec<DiagnosticCode> {
        let yaml = format!(
            "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App.Generated\n  initializerName: Initialize\n{}",
            body
        );
        let options = CompileOptions::fixed(OffsetDateTime::UNIX_EPOCH);
        let model = compile_str(&yaml, "doc.yaml", &options);
        model.diagnostics.iter().map(|d| d.code).collect()
    }

    const TYPES: &str = "namespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: ILogger\n      - interfaceName: IClock\n    classes:\n      - className: FileLogger\n        qualifiedInterfaceName: App.ILogger\n        initializerParameters:\n          - name: path\n            qualifiedClassName: string\n      - className: SystemClock\n        qualifiedInterfaceName: App.IClock\n        initializerParameters: []\n      - className: Service\n        initializerParameters:\n          - name: logger\n            qualifiedInterfaceName: App.ILogger\n          - name: retries\n            qualifiedClassName: int\n";

    #[test]
    fn duplicate_types_flag_every_member() {
        let got = codes(
            "namespaces:\n  - namespaceName: App\n    classes:\n      - className: Logger\n        initializerParameters: []\n      - className: Logger\n        initializerParameters: []\n      - className: Clock\n        initializerParameters: []\n",
        );
        assert_eq!(
            got,
            vec![DiagnosticCode::DuplicateTypeIdentifier, DiagnosticCode::DuplicateTypeIdentifier]
        );
    }

    #[test]
    fn class_and_interface_share_one_name_space() {
        let got = codes(
            "namespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: ILogger\n  - namespaceName: App\n    classes:\n      - className: ILogger\n        initializerParameters: []\n",
        );
        assert_eq!(
            got,
            vec![DiagnosticCode::DuplicateTypeIdentifier, DiagnosticCode::DuplicateTypeIdentifier]
        );
    }

    #[test]
    fn colliding_invoker_keys_are_reported() {
        let got = codes(
            "namespaces:\n  - namespaceName: A.B\n    classes:\n      - className: C\n        initializerParameters: []\n  - namespaceName: A_B\n    classes:\n      - className: C\n        initializerParameters: []\n",
        );
        assert_eq!(
            got,
            vec![DiagnosticCode::DuplicateInvokerKey, DiagnosticCode::DuplicateInvokerKey]
        );
    }

    #[test]
    fn duplicate_named_instances_group_by_class_namespace() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n",
            TYPES
        );
        assert_eq!(
            codes(&body),
            vec![DiagnosticCode::DuplicateNamedInstance, DiagnosticCode::DuplicateNamedInstance]
        );
    }

    #[test]
    fn unresolved_references_and_mismatch() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Ghost\n    qualifiedClassName: App.Missing\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n    qualifiedInterfaceName: App.IClock\n    assignments:\n      - parameterName: path\n        assignmentValue: log.txt\n  - namedInstanceName: Other\n    qualifiedClassName: App.SystemClock\n    qualifiedInterfaceName: App.IMissing\n",
            TYPES
        );
        assert_eq!(
            codes(&body),
            vec![
                DiagnosticCode::UnresolvedClass,
                DiagnosticCode::InterfaceMismatch,
                DiagnosticCode::UnresolvedInterface
            ]
        );
    }

    #[test]
    fn ordering_violations_and_missing_instances() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Svc\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: logger\n        namedInstanceName: Log\n      - parameterName: retries\n        namedInstanceName: Nowhere\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: log.txt\n",
            TYPES
        );
        assert_eq!(
            codes(&body),
            vec![
                DiagnosticCode::DependencyOrderViolation,
                DiagnosticCode::NamedInstanceMissing
            ]
        );
    }

    #[test]
    fn wiring_compatibility() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n  - namedInstanceName: Svc\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: logger\n        namedInstanceName: Clock\n      - parameterName: verbose\n        assignmentValue: \"true\"\n  - namedInstanceName: Svc2\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: logger\n        assignmentValue: console\n      - parameterName: retries\n        assignmentValue: \"3\"\n      - parameterName: retries\n        assignmentValue: \"4\"\n",
            TYPES
        );
        assert_eq!(
            codes(&body),
            vec![
                DiagnosticCode::NamedInstanceNotExposingInterface,
                DiagnosticCode::UnknownInitializerParameter,
                DiagnosticCode::UnassignedParameter,
                DiagnosticCode::LiteralForInterfaceParameter,
                DiagnosticCode::DuplicateAssignment,
            ]
        );
    }

    #[test]
    fn unassigned_parameters_only_warn() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n  - namedInstanceName: Svc\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: logger\n        namedInstanceName: Log\n",
            TYPES
        );
        let yaml = format!(
            "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App.Generated\n  initializerName: Initialize\n{}",
            body
        );
        let options = CompileOptions::fixed(OffsetDateTime::UNIX_EPOCH);
        let model = compile_str(&yaml, "doc.yaml", &options);
        assert_eq!(model.diagnostics.len(), 1);
        assert_eq!(model.diagnostics[0].code, DiagnosticCode::UnassignedParameter);
        assert_eq!(model.diagnostics[0].severity, Severity::Warning);
        assert!(model.is_generatable());
    }

    #[test]
    fn array_elements_must_expose_the_element_interface() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: log.txt\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n  - namedInstanceName: Loggers\n    qualifiedClassName: App.ILogger[]\n    qualifiedInterfaceName: App.ILogger[]\n    elements:\n      - namedInstanceName: Log\n      - namedInstanceName: Clock\n",
            TYPES
        );
        assert_eq!(codes(&body), vec![DiagnosticCode::NamedInstanceNotExposingInterface]);
    }

    #[test]
    fn element_references_follow_declaration_order() {
        let loggers = |targets: &str| {
            format!(
                "{}namedInstances:\n  - namedInstanceName: Early\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: early.log\n  - namedInstanceName: Loggers\n    qualifiedClassName: App.ILogger[]\n    qualifiedInterfaceName: App.ILogger[]\n    elements:\n{}  - namedInstanceName: Late\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: late.log\n",
                TYPES, targets
            )
        };
        assert!(codes(&loggers("      - namedInstanceName: Early\n")).is_empty());
        assert_eq!(
            codes(&loggers("      - namedInstanceName: Early\n      - namedInstanceName: Late\n")),
            vec![DiagnosticCode::DependencyOrderViolation]
        );
        assert_eq!(
            codes(&loggers("      - namedInstanceName: Nowhere\n")),
            vec![DiagnosticCode::NamedInstanceMissing]
        );
        assert_eq!(
            codes(&loggers("      - namedInstanceName: Loggers\n")),
            vec![DiagnosticCode::DependencyOrderViolation]
        );
    }

    #[test]
    fn interface_array_class_checks_its_elements() {
        let body = format!(
            "{}namedInstances:\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: log.txt\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n  - namedInstanceName: Loggers\n    qualifiedClassName: App.ILogger[]\n    elements:\n      - namedInstanceName: Log\n      - namedInstanceName: Clock\n",
            TYPES
        );
        assert_eq!(codes(&body), vec![DiagnosticCode::NamedInstanceNotExposingInterface]);
    }
}
