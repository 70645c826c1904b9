//! Pass 3: Canonical transformation -- raw DTOs to strict canonical entities.
//!
//! Each transform re-checks the identifier shape of fields pass 1 accepted,
//! computes derived values, enforces the "exactly one of" rules and extends
//! provenance with a `Transform` entry. Fields pass 1 already rejected are
//! carried through without a second diagnostic.

use crate::canonical::*;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::ident::{self, TypeRef};
use crate::provenance::{ProvenanceContext, ProvenanceStack};
use crate::raw::*;
use std::collections::HashSet;

const MISSING_PARAMETER_TYPE: &str = "<missing.parameterType>";
const MISSING_VALUE: &str = "<missing.value>";

pub fn transform(raw: &RawModel, ctx: &ProvenanceContext, diags: &mut Diagnostics) -> Model {
    let mut tx = Transformer { ctx, diags };

    let code_gen = tx.code_gen(&raw.code_gen);
    let mut namespaces = Vec::with_capacity(raw.namespaces.len());
    for ns in &raw.namespaces {
        namespaces.push(tx.namespace(ns));
    }
    let mut named_instances = Vec::with_capacity(raw.named_instances.len());
    for inst in &raw.named_instances {
        named_instances.push(tx.named_instance(inst));
    }

    Model {
        source: raw.source.clone(),
        code_gen,
        namespaces,
        named_instances,
        provenance: ctx.extend(&raw.prov),
        diagnostics: Vec::new(),
    }
}

/// Diagnostic code for a name that fails the simple-or-qualified grammar.
fn shape_code(value: &str) -> DiagnosticCode {
    if value.contains('.') {
        DiagnosticCode::InvalidQualifiedName
    } else {
        DiagnosticCode::InvalidIdentifier
    }
}

struct Transformer<'a> {
    ctx: &'a ProvenanceContext,
    diags: &'a mut Diagnostics,
}

impl<'a> Transformer<'a> {
    /// True when `scalar` was accepted by pass 1 and still satisfies `ok`.
    fn recheck(&mut self, scalar: &RawScalar, ok: fn(&str) -> bool, code: DiagnosticCode) -> bool {
        if !scalar.is_valid() {
            return false;
        }
        if ok(&scalar.value) {
            return true;
        }
        self.diags.push(Diagnostic::at_origin(
            code,
            format!("'{}' is not a well-formed name", scalar.value),
            &scalar.origin,
        ));
        false
    }

    // ──────────────────────────────────────────────
    // codeGen
    // ──────────────────────────────────────────────

    fn code_gen(&mut self, raw: &RawCodeGen) -> CodeGenConfig {
        self.recheck(
            &raw.registry_class_name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );
        self.recheck(
            &raw.namespace_name,
            ident::is_simple_or_qualified,
            shape_code(&raw.namespace_name.value),
        );
        self.recheck(
            &raw.initializer_name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );

        CodeGenConfig {
            registry_class_name: raw.registry_class_name.value.clone(),
            generated_code_path: raw.generated_code_path.value.clone(),
            namespace_name: raw.namespace_name.value.clone(),
            initializer_name: raw.initializer_name.value.clone(),
            package_references: raw
                .package_references
                .iter()
                .map(|r| r.value.clone())
                .collect(),
            provenance: self.ctx.extend(&raw.prov),
        }
    }

    // ──────────────────────────────────────────────
    // Namespaces and types
    // ──────────────────────────────────────────────

    fn namespace(&mut self, raw: &RawNamespace) -> Namespace {
        let provenance = self.ctx.extend(&raw.prov);
        self.recheck(&raw.name, ident::is_simple_or_qualified, shape_code(&raw.name.value));

        if !raw.placeholder && raw.interfaces.is_empty() && raw.classes.is_empty() {
            self.diags.push(Diagnostic::at(
                DiagnosticCode::EmptyNamespace,
                format!("namespace '{}' declares no interfaces or classes", raw.name.value),
                &provenance,
            ));
        }

        let mut interfaces = Vec::with_capacity(raw.interfaces.len());
        for iface in &raw.interfaces {
            interfaces.push(self.interface(&raw.name.value, iface));
        }
        let mut classes = Vec::with_capacity(raw.classes.len());
        for class in &raw.classes {
            classes.push(self.class(&raw.name.value, class));
        }

        Namespace {
            name: raw.name.value.clone(),
            interfaces,
            classes,
            provenance,
        }
    }

    fn interface(&mut self, namespace: &str, raw: &RawInterface) -> Interface {
        let name_ok = self.recheck(
            &raw.name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );
        if name_ok && !ident::is_interface_name(&raw.name.value) {
            self.diags.push(Diagnostic::at_origin(
                DiagnosticCode::InterfaceNamingConvention,
                format!(
                    "interface name '{}' should start with 'I' followed by an uppercase letter",
                    raw.name.value
                ),
                &raw.name.origin,
            ));
        }

        Interface {
            name: raw.name.value.clone(),
            qualified_name: ident::qualify(namespace, &raw.name.value),
            provenance: self.ctx.extend(&raw.prov),
        }
    }

    fn class(&mut self, namespace: &str, raw: &RawClass) -> Class {
        let name_ok = self.recheck(
            &raw.name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );
        if name_ok && !ident::is_pascal_case(&raw.name.value) {
            self.diags.push(Diagnostic::at_origin(
                DiagnosticCode::ClassNamingConvention,
                format!("class name '{}' should be PascalCase", raw.name.value),
                &raw.name.origin,
            ));
        }

        let qualified_name = ident::qualify(namespace, &raw.name.value);
        let qualified_interface_name = raw.qualified_interface.as_ref().map(|r| r.resolved().base);
        let effective_return_type = qualified_interface_name
            .clone()
            .unwrap_or_else(|| qualified_name.clone());
        let invoker_key = ident::invoker_key(&qualified_name);

        let raw_params = raw.initializer_parameters.as_deref().unwrap_or(&[]);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut initializer_parameters = Vec::with_capacity(raw_params.len());
        for param in raw_params {
            let counted = !param.placeholder && !is_placeholder(&param.name.value);
            if counted && !seen.insert(param.name.value.as_str()) {
                self.diags.push(Diagnostic::at_origin(
                    DiagnosticCode::DuplicateParameterName,
                    format!(
                        "parameter '{}' is declared more than once in class '{}'",
                        param.name.value, qualified_name
                    ),
                    &param.name.origin,
                ));
            }
            initializer_parameters.push(self.parameter(param));
        }

        Class {
            name: raw.name.value.clone(),
            qualified_name,
            qualified_interface_name,
            effective_return_type,
            invoker_key,
            initializer_parameters,
            provenance: self.ctx.extend(&raw.prov),
        }
    }

    fn parameter(&mut self, raw: &RawParameter) -> Parameter {
        let provenance = self.ctx.extend(&raw.prov);
        let name_ok = self.recheck(
            &raw.name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );

        let (type_, type_ok) = match (&raw.class_ref, &raw.interface_ref) {
            (Some(_), Some(iface)) => {
                self.diags.push(Diagnostic::at(
                    DiagnosticCode::ParameterBothClassAndInterface,
                    format!(
                        "parameter '{}' declares both 'qualifiedClassName' and 'qualifiedInterfaceName'; exactly one is allowed",
                        raw.name.value
                    ),
                    &provenance,
                ));
                (ParameterType::Interface(iface.resolved()), false)
            }
            (None, None) => {
                if !raw.placeholder {
                    self.diags.push(Diagnostic::at(
                        DiagnosticCode::ParameterMissingType,
                        format!(
                            "parameter '{}' must declare one of 'qualifiedClassName' or 'qualifiedInterfaceName'",
                            raw.name.value
                        ),
                        &provenance,
                    ));
                }
                (ParameterType::Class(TypeRef::named(MISSING_PARAMETER_TYPE)), false)
            }
            (Some(class), None) => (ParameterType::Class(class.resolved()), ref_ok(class)),
            (None, Some(iface)) => (ParameterType::Interface(iface.resolved()), ref_ok(iface)),
        };

        Parameter {
            name: raw.name.value.clone(),
            type_,
            is_valid: !raw.placeholder && name_ok && type_ok,
            provenance,
        }
    }

    // ──────────────────────────────────────────────
    // Named instances
    // ──────────────────────────────────────────────

    fn named_instance(&mut self, raw: &RawNamedInstance) -> NamedInstance {
        let provenance = self.ctx.extend(&raw.prov);
        let name_ok = self.recheck(
            &raw.name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );
        let class_type = raw.class_ref.resolved();
        let interface_ok = raw.interface_ref.as_ref().map_or(true, ref_ok);

        let raw_assignments = raw.assignments.as_deref().unwrap_or(&[]);
        let raw_elements = raw.elements.as_deref().unwrap_or(&[]);
        let both = !raw_assignments.is_empty() && !raw_elements.is_empty();
        if both {
            self.diags.push(Diagnostic::at(
                DiagnosticCode::NamedInstanceBothAssignmentsAndElements,
                format!(
                    "named instance '{}' declares both 'assignments' and 'elements'; at most one is allowed",
                    raw.name.value
                ),
                &provenance,
            ));
        }

        let mut array_ok = true;
        if !both && !raw_elements.is_empty() && ref_ok(&raw.class_ref) && !class_type.is_array {
            self.diags.push(Diagnostic::at(
                DiagnosticCode::ElementsRequireArrayType,
                format!(
                    "named instance '{}' lists elements but its class type '{}' is not an array",
                    raw.name.value, class_type
                ),
                &provenance,
            ));
            array_ok = false;
        }

        let mut assignments = Vec::with_capacity(raw_assignments.len());
        for a in raw_assignments {
            assignments.push(self.assignment(a));
        }
        // With both lists present the elements are still checked, then dropped.
        let mut elements = Vec::with_capacity(raw_elements.len());
        for e in raw_elements {
            elements.push(self.element(e));
        }

        let initialization = if !assignments.is_empty() {
            Initialization::Assignments(assignments)
        } else if !elements.is_empty() {
            Initialization::Elements(elements)
        } else {
            Initialization::Default
        };

        NamedInstance {
            name: raw.name.value.clone(),
            class_type,
            interface_type: raw.interface_ref.as_ref().map(RawTypeRef::resolved),
            initialization,
            is_valid: !raw.placeholder
                && name_ok
                && ref_ok(&raw.class_ref)
                && interface_ok
                && !both
                && array_ok,
            provenance,
        }
    }

    fn assignment(&mut self, raw: &RawAssignment) -> Assignment {
        let provenance = self.ctx.extend(&raw.prov);
        let name_ok = self.recheck(
            &raw.parameter_name,
            ident::is_simple_identifier,
            DiagnosticCode::InvalidIdentifier,
        );
        let (wiring, wiring_ok) = self.wiring(
            raw.value.as_ref(),
            raw.instance_ref.as_ref(),
            raw.placeholder,
            &provenance,
            WiringSite::Assignment(&raw.parameter_name.value),
        );
        Assignment {
            parameter_name: raw.parameter_name.value.clone(),
            wiring,
            is_valid: !raw.placeholder && name_ok && wiring_ok,
            provenance,
        }
    }

    fn element(&mut self, raw: &RawElement) -> Element {
        let provenance = self.ctx.extend(&raw.prov);
        let (wiring, wiring_ok) = self.wiring(
            raw.value.as_ref(),
            raw.instance_ref.as_ref(),
            raw.placeholder,
            &provenance,
            WiringSite::Element,
        );
        Element {
            wiring,
            is_valid: !raw.placeholder && wiring_ok,
            provenance,
        }
    }

    fn wiring(
        &mut self,
        value: Option<&RawScalar>,
        instance_ref: Option<&RawScalar>,
        placeholder: bool,
        provenance: &ProvenanceStack,
        site: WiringSite<'_>,
    ) -> (Wiring, bool) {
        match (value, instance_ref) {
            (Some(_), Some(r)) => {
                let (code, what) = match site {
                    WiringSite::Assignment(p) => (
                        DiagnosticCode::AssignmentBothValueAndReference,
                        format!("assignment to '{}'", p),
                    ),
                    WiringSite::Element => {
                        (DiagnosticCode::ElementBothValueAndReference, "element".to_owned())
                    }
                };
                self.diags.push(Diagnostic::at(
                    code,
                    format!(
                        "{} declares both 'assignmentValue' and 'namedInstanceName'; exactly one is allowed",
                        what
                    ),
                    provenance,
                ));
                (Wiring::Instance(r.value.clone()), false)
            }
            (None, None) => {
                if !placeholder {
                    let (code, what) = match site {
                        WiringSite::Assignment(p) => (
                            DiagnosticCode::AssignmentMissingValue,
                            format!("assignment to '{}'", p),
                        ),
                        WiringSite::Element => {
                            (DiagnosticCode::ElementMissingValue, "element".to_owned())
                        }
                    };
                    self.diags.push(Diagnostic::at(
                        code,
                        format!(
                            "{} must declare one of 'assignmentValue' or 'namedInstanceName'",
                            what
                        ),
                        provenance,
                    ));
                }
                (Wiring::Value(MISSING_VALUE.to_owned()), false)
            }
            (Some(v), None) => (Wiring::Value(v.value.clone()), v.is_valid()),
            (None, Some(r)) => (Wiring::Instance(r.value.clone()), r.is_valid()),
        }
    }
}

#[derive(Clone, Copy)]
enum WiringSite<'a> {
    Assignment(&'a str),
    Element,
}

fn ref_ok(r: &RawTypeRef) -> bool {
    r.text.is_valid() && r.parsed.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::node::Node;
    use crate::pass1_extract::extract;
    use crate::provenance::Stage;
    use time::OffsetDateTime;

    const CODE_GEN: &str = "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App.Generated\n  initializerName: Initialize\n";

    fn run(body: &str) -> (Model, Vec<Diagnostic>) {
        let yaml = format!("{}{}", CODE_GEN, body);
        let root = Node::from_yaml_str(&yaml).unwrap();
        let extract_ctx =
            ProvenanceContext::new(Stage::Extract, "test", OffsetDateTime::UNIX_EPOCH);
        let mut diags = Diagnostics::new();
        let raw = extract(&root, "doc.yaml", &extract_ctx, &mut diags).unwrap();
        let model = transform(&raw, &extract_ctx.for_stage(Stage::Transform), &mut diags);
        (model, diags.into_vec())
    }

    fn codes(diags: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diags.iter().map(|d| d.code).collect()
    }

    fn with_params(params: &str) -> String {
        format!(
            "namespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: ILogger\n    classes:\n      - className: Service\n        initializerParameters:\n{}",
            params
        )
    }

    #[test]
    fn class_without_interface_returns_itself() {
        let (model, diags) = run(
            "namespaces:\n  - namespaceName: App\n    classes:\n      - className: Logger\n        initializerParameters: []\n",
        );
        assert!(diags.is_empty());
        let class = &model.namespaces[0].classes[0];
        assert_eq!(class.qualified_name, "App.Logger");
        assert_eq!(class.effective_return_type, "App.Logger");
        assert_eq!(class.invoker_key, "App_Logger");
        assert_eq!(class.provenance.len(), 2);
        assert_eq!(class.provenance.latest().stage, Stage::Transform);
    }

    #[test]
    fn exposed_interface_becomes_return_type() {
        let (model, diags) = run(
            "namespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: ILogger\n    classes:\n      - className: FileLogger\n        qualifiedInterfaceName: App.ILogger\n        initializerParameters: []\n",
        );
        assert!(diags.is_empty());
        let class = &model.namespaces[0].classes[0];
        assert_eq!(class.qualified_interface_name.as_deref(), Some("App.ILogger"));
        assert_eq!(class.effective_return_type, "App.ILogger");
        assert_eq!(model.namespaces[0].interfaces[0].qualified_name, "App.ILogger");
    }

    #[test]
    fn parameter_with_either_reference_is_valid() {
        let (model, diags) = run(&with_params(
            "          - name: logger\n            qualifiedInterfaceName: App.ILogger\n          - name: retries\n            qualifiedClassName: int\n",
        ));
        assert!(diags.is_empty());
        let params = &model.namespaces[0].classes[0].initializer_parameters;
        assert!(params[0].type_.is_interface());
        assert_eq!(params[1].type_, ParameterType::Class(TypeRef::named("int")));
        assert!(params.iter().all(|p| p.is_valid));
    }

    #[test]
    fn parameter_with_both_references_keeps_the_interface() {
        let (model, diags) = run(&with_params(
            "          - name: logger\n            qualifiedClassName: int\n            qualifiedInterfaceName: App.ILogger\n",
        ));
        assert_eq!(codes(&diags), vec![DiagnosticCode::ParameterBothClassAndInterface]);
        let param = &model.namespaces[0].classes[0].initializer_parameters[0];
        assert!(!param.is_valid);
        assert_eq!(param.type_.type_ref().base, "App.ILogger");
    }

    #[test]
    fn parameter_with_neither_reference_gets_a_sentinel() {
        let (model, diags) = run(&with_params("          - name: logger\n"));
        assert_eq!(codes(&diags), vec![DiagnosticCode::ParameterMissingType]);
        let param = &model.namespaces[0].classes[0].initializer_parameters[0];
        assert!(!param.is_valid);
        assert_eq!(
            param.type_,
            ParameterType::Class(TypeRef::named("<missing.parameterType>"))
        );
    }

    #[test]
    fn duplicate_parameter_names_are_reported_once_per_repeat() {
        let (_, diags) = run(&with_params(
            "          - name: retries\n            qualifiedClassName: int\n          - name: retries\n            qualifiedClassName: string\n",
        ));
        assert_eq!(codes(&diags), vec![DiagnosticCode::DuplicateParameterName]);
        assert_eq!(
            diags[0].location,
            "doc.yaml#namespaces[0].classes[0].initializerParameters[1].name"
        );
    }

    #[test]
    fn naming_conventions_warn_without_dropping_entities() {
        let (model, diags) = run(
            "namespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: FileLogger\n    classes:\n      - className: fileWriter\n        initializerParameters: []\n",
        );
        assert_eq!(
            codes(&diags),
            vec![
                DiagnosticCode::InterfaceNamingConvention,
                DiagnosticCode::ClassNamingConvention
            ]
        );
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert_eq!(model.namespaces[0].interfaces[0].name, "FileLogger");
        assert_eq!(model.namespaces[0].classes[0].name, "fileWriter");
    }

    #[test]
    fn empty_namespace_is_informational() {
        let (_, diags) = run("namespaces:\n  - namespaceName: App\n");
        assert_eq!(codes(&diags), vec![DiagnosticCode::EmptyNamespace]);
        assert_eq!(diags[0].severity, Severity::Info);
    }

    #[test]
    fn assignment_dualities() {
        let (model, diags) = run(
            "namedInstances:\n  - namedInstanceName: Svc\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: a\n        assignmentValue: \"1\"\n      - parameterName: b\n        namedInstanceName: Other\n      - parameterName: c\n        assignmentValue: \"2\"\n        namedInstanceName: Other\n      - parameterName: d\n",
        );
        assert_eq!(
            codes(&diags),
            vec![
                DiagnosticCode::AssignmentBothValueAndReference,
                DiagnosticCode::AssignmentMissingValue
            ]
        );
        let Initialization::Assignments(items) = &model.named_instances[0].initialization else {
            panic!("expected assignments");
        };
        assert_eq!(items[0].wiring, Wiring::Value("1".into()));
        assert_eq!(items[1].wiring, Wiring::Instance("Other".into()));
        assert_eq!(items[2].wiring, Wiring::Instance("Other".into()));
        assert_eq!(items[3].wiring, Wiring::Value("<missing.value>".into()));
        let valid: Vec<bool> = items.iter().map(|a| a.is_valid).collect();
        assert_eq!(valid, vec![true, true, false, false]);
    }

    #[test]
    fn element_dualities() {
        let (_, diags) = run(
            "namedInstances:\n  - namedInstanceName: Names\n    qualifiedClassName: string[]\n    elements:\n      - assignmentValue: a\n      - assignmentValue: b\n        namedInstanceName: Other\n      - {}\n",
        );
        assert_eq!(
            codes(&diags),
            vec![
                DiagnosticCode::ElementBothValueAndReference,
                DiagnosticCode::ElementMissingValue
            ]
        );
    }

    #[test]
    fn instance_with_both_lists_keeps_assignments() {
        let (model, diags) = run(
            "namedInstances:\n  - namedInstanceName: Svc\n    qualifiedClassName: App.Service\n    assignments:\n      - parameterName: a\n        assignmentValue: \"1\"\n    elements:\n      - {}\n",
        );
        assert_eq!(
            codes(&diags),
            vec![
                DiagnosticCode::NamedInstanceBothAssignmentsAndElements,
                DiagnosticCode::ElementMissingValue
            ]
        );
        let inst = &model.named_instances[0];
        assert!(!inst.is_valid);
        assert_eq!(inst.initialization.kind(), "assignments");
    }

    #[test]
    fn instance_without_lists_is_default() {
        let (model, diags) = run(
            "namedInstances:\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n",
        );
        assert!(diags.is_empty());
        assert_eq!(model.named_instances[0].initialization.kind(), "default");
        assert!(model.named_instances[0].is_valid);
    }

    #[test]
    fn elements_need_an_array_class_type() {
        let (model, diags) = run(
            "namedInstances:\n  - namedInstanceName: Name\n    qualifiedClassName: string\n    elements:\n      - assignmentValue: a\n",
        );
        assert_eq!(codes(&diags), vec![DiagnosticCode::ElementsRequireArrayType]);
        assert!(!model.named_instances[0].is_valid);
    }
}
