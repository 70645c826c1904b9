//! Pass 1: syntactic extraction -- walk the node tree and build the raw model.
//!
//! A bad node never aborts the walk. Each problem is recorded as a
//! diagnostic and replaced by a placeholder so that sibling declarations are
//! still visited. Only a root that is empty or not a mapping is fatal.

mod codegen;
mod instance;
mod namespace;

use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::ident::{self, TypeRefError};
use crate::node::{Node, NodeKind};
use crate::provenance::{key_path, ProvenanceContext, ProvenanceOrigin, ProvenanceStack, ROOT_PATH};
use crate::raw::*;

const ROOT_KEYS: &[&str] = &["codeGen", "namespaces", "namedInstances"];

/// Build the raw model for one document.
///
/// `Err` carries the single fatal diagnostic for an unusable root; every
/// other problem is pushed onto `diags`.
pub fn extract(
    root: &Node,
    source: &str,
    ctx: &ProvenanceContext,
    diags: &mut Diagnostics,
) -> Result<RawModel, Diagnostic> {
    let root_origin = ProvenanceOrigin::new(
        source,
        root.position.line,
        root.position.column,
        ROOT_PATH,
    );
    let entries = match root.as_mapping() {
        Some(entries) => entries,
        None => {
            return Err(Diagnostic::at_origin(
                DiagnosticCode::RootNotMapping,
                format!("document root must be a mapping, found a {}", root.kind_name()),
                &root_origin,
            ))
        }
    };
    if entries.is_empty() {
        return Err(Diagnostic::at_origin(
            DiagnosticCode::EmptyDocument,
            "document contains no declarations",
            &root_origin,
        ));
    }

    let mut ex = Extractor { source, ctx, diags };
    ex.check_keys(entries, ROOT_KEYS, ROOT_PATH, "document");
    let code_gen = codegen::extract_code_gen(&mut ex, root);
    let namespaces = namespace::extract_namespaces(&mut ex, root);
    let named_instances = instance::extract_named_instances(&mut ex, root);

    Ok(RawModel {
        source: source.to_owned(),
        code_gen,
        namespaces,
        named_instances,
        prov: ctx.make(root_origin),
    })
}

/// Required shape of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Simple,
    SimpleOrQualified,
    /// Any non-empty text (paths, literal values, type tokens before parsing).
    Text,
}

/// Result of looking up a child sequence.
enum Seq<'n> {
    Absent,
    /// Present but not a sequence; already reported.
    Invalid,
    Items(&'n [Node]),
}

/// Kind of type reference, which decides the allowed base names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    /// Primitive or qualified class name, modifiers allowed.
    Class,
    /// Qualified interface name, modifiers allowed.
    Interface,
    /// Qualified interface name, no modifiers.
    BareInterface,
}

fn is_null(value: &str) -> bool {
    matches!(value.trim(), "" | "~" | "null")
}

struct Extractor<'a> {
    source: &'a str,
    ctx: &'a ProvenanceContext,
    diags: &'a mut Diagnostics,
}

impl<'a> Extractor<'a> {
    fn origin(&self, node: &Node, path: &str) -> ProvenanceOrigin {
        ProvenanceOrigin::new(self.source, node.position.line, node.position.column, path)
    }

    fn stack(&self, node: &Node, path: &str) -> ProvenanceStack {
        self.ctx.make(self.origin(node, path))
    }

    fn report(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        origin: &ProvenanceOrigin,
    ) {
        self.diags.push(Diagnostic::at_origin(code, message, origin));
    }

    fn placeholder_scalar(&self, node: &Node, path: &str, value: String) -> RawScalar {
        RawScalar {
            value,
            origin: self.origin(node, path),
            status: FieldStatus::Missing,
        }
    }

    /// The entries of `node`, or `None` after reporting `InvalidNode`.
    fn mapping<'n>(
        &mut self,
        node: &'n Node,
        path: &str,
        kind: &str,
    ) -> Option<&'n [(String, Node)]> {
        match node.as_mapping() {
            Some(entries) => Some(entries),
            None => {
                let origin = self.origin(node, path);
                self.report(
                    DiagnosticCode::InvalidNode,
                    format!("expected a {} mapping, found a {}", kind, node.kind_name()),
                    &origin,
                );
                None
            }
        }
    }

    fn check_keys(&mut self, entries: &[(String, Node)], allowed: &[&str], path: &str, kind: &str) {
        for (key, value) in entries {
            if !allowed.contains(&key.as_str()) {
                let origin = self.origin(value, &key_path(path, key));
                self.report(
                    DiagnosticCode::UnknownKey,
                    format!(
                        "unknown key '{}' in {}; expected one of: {}",
                        key,
                        kind,
                        allowed.join(", ")
                    ),
                    &origin,
                );
            }
        }
    }

    fn required_scalar(
        &mut self,
        parent: &Node,
        path: &str,
        key: &str,
        kind: &str,
        shape: Shape,
    ) -> RawScalar {
        let field_path = key_path(path, key);
        let node = match parent.get(key) {
            Some(node) => node,
            None => {
                let origin = self.origin(parent, &field_path);
                self.report(
                    DiagnosticCode::MissingRequiredKey,
                    format!("{} is missing required key '{}'", kind, key),
                    &origin,
                );
                return self.placeholder_scalar(parent, &field_path, missing_placeholder(key));
            }
        };
        match node.as_scalar() {
            None => {
                let origin = self.origin(node, &field_path);
                self.report(
                    DiagnosticCode::ExpectedScalar,
                    format!("'{}' must be a scalar, found a {}", key, node.kind_name()),
                    &origin,
                );
                self.placeholder_scalar(node, &field_path, missing_placeholder(key))
            }
            Some(value) if is_null(value) => {
                let origin = self.origin(node, &field_path);
                self.report(
                    DiagnosticCode::EmptyValue,
                    format!("'{}' must not be empty", key),
                    &origin,
                );
                self.placeholder_scalar(node, &field_path, missing_placeholder(key))
            }
            Some(value) => {
                let mut scalar = RawScalar {
                    value: value.to_owned(),
                    origin: self.origin(node, &field_path),
                    status: FieldStatus::Valid,
                };
                self.check_shape(&mut scalar, key, shape);
                scalar
            }
        }
    }

    /// Absent and null values are both `None`.
    fn optional_scalar(
        &mut self,
        parent: &Node,
        path: &str,
        key: &str,
        shape: Shape,
    ) -> Option<RawScalar> {
        let node = parent.get(key)?;
        let field_path = key_path(path, key);
        match node.as_scalar() {
            None => {
                let origin = self.origin(node, &field_path);
                self.report(
                    DiagnosticCode::ExpectedScalar,
                    format!("'{}' must be a scalar, found a {}", key, node.kind_name()),
                    &origin,
                );
                None
            }
            Some(value) if is_null(value) => None,
            Some(value) => {
                let mut scalar = RawScalar {
                    value: value.to_owned(),
                    origin: self.origin(node, &field_path),
                    status: FieldStatus::Valid,
                };
                self.check_shape(&mut scalar, key, shape);
                Some(scalar)
            }
        }
    }

    fn check_shape(&mut self, scalar: &mut RawScalar, key: &str, shape: Shape) {
        let (ok, code, expected) = match shape {
            Shape::Text => return,
            Shape::Simple => (
                ident::is_simple_identifier(&scalar.value),
                DiagnosticCode::InvalidIdentifier,
                "a simple identifier",
            ),
            Shape::SimpleOrQualified => {
                let code = if scalar.value.contains('.') {
                    DiagnosticCode::InvalidQualifiedName
                } else {
                    DiagnosticCode::InvalidIdentifier
                };
                (
                    ident::is_simple_or_qualified(&scalar.value),
                    code,
                    "a simple or qualified identifier",
                )
            }
        };
        if !ok {
            self.report(
                code,
                format!("'{}' is not {} (key '{}')", scalar.value, expected, key),
                &scalar.origin,
            );
            scalar.status = FieldStatus::Malformed;
        }
    }

    /// Parse a type token and check its base against `kind`.
    fn type_ref(&mut self, mut text: RawScalar, key: &str, kind: RefKind) -> RawTypeRef {
        if !text.is_valid() {
            return RawTypeRef { text, parsed: None };
        }
        let parsed = match ident::parse_type_ref(&text.value) {
            Ok(parsed) => parsed,
            Err(e) => {
                let code = match e {
                    TypeRefError::NullableElementArray(_) => {
                        DiagnosticCode::UnsupportedNullableElementArray
                    }
                    _ => DiagnosticCode::InvalidTypeReference,
                };
                self.report(
                    code,
                    format!("invalid type reference for '{}': {}", key, e),
                    &text.origin,
                );
                text.status = FieldStatus::Malformed;
                return RawTypeRef { text, parsed: None };
            }
        };

        let base_ok = match kind {
            RefKind::Class => parsed.is_primitive() || ident::is_qualified_name(&parsed.base),
            RefKind::Interface => {
                !parsed.is_primitive() && ident::is_qualified_name(&parsed.base)
            }
            RefKind::BareInterface => {
                !parsed.has_modifiers()
                    && !parsed.is_primitive()
                    && ident::is_qualified_name(&parsed.base)
            }
        };
        if !base_ok {
            let expected = match kind {
                RefKind::Class => "a primitive type or a namespace-qualified class name",
                RefKind::Interface => "a namespace-qualified interface name",
                RefKind::BareInterface => "a namespace-qualified interface name without modifiers",
            };
            self.report(
                DiagnosticCode::InvalidQualifiedName,
                format!("'{}' is not {} (key '{}')", text.value, expected, key),
                &text.origin,
            );
            text.status = FieldStatus::Malformed;
        }
        RawTypeRef {
            text,
            parsed: Some(parsed),
        }
    }

    fn required_type_ref(
        &mut self,
        parent: &Node,
        path: &str,
        key: &str,
        kind_name: &str,
        kind: RefKind,
    ) -> RawTypeRef {
        let text = self.required_scalar(parent, path, key, kind_name, Shape::Text);
        self.type_ref(text, key, kind)
    }

    fn optional_type_ref(
        &mut self,
        parent: &Node,
        path: &str,
        key: &str,
        kind: RefKind,
    ) -> Option<RawTypeRef> {
        let text = self.optional_scalar(parent, path, key, Shape::Text)?;
        Some(self.type_ref(text, key, kind))
    }

    fn sequence<'n>(&mut self, parent: &'n Node, path: &str, key: &str) -> Seq<'n> {
        let node = match parent.get(key) {
            Some(node) => node,
            None => return Seq::Absent,
        };
        match &node.kind {
            NodeKind::Sequence(items) => Seq::Items(items),
            NodeKind::Scalar(value) if is_null(value) => Seq::Absent,
            _ => {
                let origin = self.origin(node, &key_path(path, key));
                self.report(
                    DiagnosticCode::ExpectedSequence,
                    format!("'{}' must be a sequence, found a {}", key, node.kind_name()),
                    &origin,
                );
                Seq::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::Stage;
    use time::OffsetDateTime;

    fn run(yaml: &str) -> (Result<RawModel, Diagnostic>, Vec<Diagnostic>) {
        let root = Node::from_yaml_str(yaml).unwrap();
        let ctx = ProvenanceContext::new(Stage::Extract, "test", OffsetDateTime::UNIX_EPOCH);
        let mut diags = Diagnostics::new();
        let model = extract(&root, "doc.yaml", &ctx, &mut diags);
        (model, diags.into_vec())
    }

    fn codes(diags: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diags.iter().map(|d| d.code).collect()
    }

    const CODE_GEN: &str = "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App.Generated\n  initializerName: Initialize\n";

    #[test]
    fn non_mapping_root_is_fatal() {
        let root = Node::from_json(&serde_json::json!(["a"]));
        let ctx = ProvenanceContext::new(Stage::Extract, "test", OffsetDateTime::UNIX_EPOCH);
        let mut diags = Diagnostics::new();
        let err = extract(&root, "doc.json", &ctx, &mut diags).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::RootNotMapping);
        assert!(diags.is_empty());
    }

    #[test]
    fn unknown_keys_do_not_abort() {
        let yaml = format!(
            "{}namespaces:\n  - namespaceName: App\n    colour: blue\n    classes:\n      - className: Logger\n        initializerParameters: []\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        let model = model.unwrap();
        assert_eq!(codes(&diags), vec![DiagnosticCode::UnknownKey]);
        assert_eq!(diags[0].location, "doc.yaml#namespaces[0].colour");
        assert_eq!(model.namespaces[0].classes.len(), 1);
    }

    #[test]
    fn invalid_class_node_gets_placeholder_and_siblings_continue() {
        let yaml = format!(
            "{}namespaces:\n  - namespaceName: App\n    classes:\n      - just-a-string\n      - className: Logger\n        initializerParameters: []\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        let model = model.unwrap();
        assert_eq!(codes(&diags), vec![DiagnosticCode::InvalidNode]);
        let classes = &model.namespaces[0].classes;
        assert_eq!(classes.len(), 2);
        assert!(classes[0].placeholder);
        assert_eq!(classes[0].name.value, "<invalid.class>");
        assert_eq!(classes[1].name.value, "Logger");
    }

    #[test]
    fn missing_and_malformed_scalars() {
        let yaml = "codeGen:\n  registryClassName: 9Registry\n  generatedCodePath: Generated\n  namespaceName: App\n";
        let (model, diags) = run(yaml);
        let model = model.unwrap();
        assert_eq!(
            codes(&diags),
            vec![DiagnosticCode::InvalidIdentifier, DiagnosticCode::MissingRequiredKey]
        );
        assert_eq!(model.code_gen.registry_class_name.value, "9Registry");
        assert_eq!(model.code_gen.registry_class_name.status, FieldStatus::Malformed);
        assert_eq!(model.code_gen.initializer_name.value, "<missing.initializerName>");
    }

    #[test]
    fn class_without_parameter_list_is_distinct_from_empty_list() {
        let yaml = format!(
            "{}namespaces:\n  - namespaceName: App\n    classes:\n      - className: A\n      - className: B\n        initializerParameters: []\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        let model = model.unwrap();
        assert_eq!(codes(&diags), vec![DiagnosticCode::MissingRequiredKey]);
        assert!(model.namespaces[0].classes[0].initializer_parameters.is_none());
        assert_eq!(
            model.namespaces[0].classes[1].initializer_parameters.as_deref().map(<[_]>::len),
            Some(0)
        );
    }

    #[test]
    fn concrete_class_parameters_are_rejected() {
        let yaml = format!(
            "{}namespaces:\n  - namespaceName: App\n    classes:\n      - className: Service\n        initializerParameters:\n          - name: logger\n            qualifiedClassName: App.FileLogger\n          - name: retries\n            qualifiedClassName: int\n",
            CODE_GEN
        );
        let (_, diags) = run(&yaml);
        assert_eq!(codes(&diags), vec![DiagnosticCode::ParameterClassNotPrimitive]);
        assert_eq!(
            diags[0].location,
            "doc.yaml#namespaces[0].classes[0].initializerParameters[0].qualifiedClassName"
        );
    }

    #[test]
    fn concrete_class_beside_an_interface_is_left_to_the_pair_check() {
        let yaml = format!(
            "{}namespaces:\n  - namespaceName: App\n    classes:\n      - className: Service\n        initializerParameters:\n          - name: logger\n            qualifiedClassName: App.FileLogger\n            qualifiedInterfaceName: App.ILogger\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        assert!(diags.is_empty(), "{:?}", diags);
        let params = model.unwrap().namespaces[0].classes[0]
            .initializer_parameters
            .clone()
            .unwrap();
        assert!(params[0].class_ref.is_some());
        assert!(params[0].interface_ref.is_some());
    }

    #[test]
    fn nullable_element_arrays_have_their_own_code() {
        let yaml = format!(
            "{}namedInstances:\n  - namedInstanceName: Values\n    qualifiedClassName: \"int?[]\"\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        assert_eq!(
            codes(&diags),
            vec![DiagnosticCode::UnsupportedNullableElementArray]
        );
        assert!(model.unwrap().named_instances[0].class_ref.parsed.is_none());
    }

    #[test]
    fn duplicate_package_references_warn() {
        let yaml = format!(
            "{}  packageReferences:\n    - Serilog\n    - Serilog\n",
            CODE_GEN
        );
        let (model, diags) = run(&yaml);
        assert_eq!(codes(&diags), vec![DiagnosticCode::DuplicatePackageReference]);
        assert_eq!(model.unwrap().code_gen.package_references.len(), 2);
    }

    #[test]
    fn explicit_empty_assignment_list_is_redundant() {
        let yaml = format!(
            "{}namedInstances:\n  - namedInstanceName: Clock\n    qualifiedClassName: App.SystemClock\n    assignments: []\n",
            CODE_GEN
        );
        let (_, diags) = run(&yaml);
        assert_eq!(codes(&diags), vec![DiagnosticCode::RedundantEmptyList]);
    }
}
