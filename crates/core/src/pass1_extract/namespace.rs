//! Namespace, interface, class and initializer parameter extraction.

use super::{Extractor, RefKind, Seq, Shape};
use crate::diagnostic::DiagnosticCode;
use crate::node::Node;
use crate::provenance::{index_path, key_path, ROOT_PATH};
use crate::raw::*;

const NAMESPACE_KEYS: &[&str] = &["namespaceName", "interfaces", "classes"];
const INTERFACE_KEYS: &[&str] = &["interfaceName"];
const CLASS_KEYS: &[&str] = &["className", "qualifiedInterfaceName", "initializerParameters"];
const PARAMETER_KEYS: &[&str] = &["name", "qualifiedClassName", "qualifiedInterfaceName"];

pub(super) fn extract_namespaces(ex: &mut Extractor<'_>, root: &Node) -> Vec<RawNamespace> {
    let items = match ex.sequence(root, ROOT_PATH, "namespaces") {
        Seq::Items(items) => items,
        Seq::Absent | Seq::Invalid => return Vec::new(),
    };
    let mut namespaces = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = index_path(ROOT_PATH, "namespaces", i);
        namespaces.push(extract_namespace(ex, item, &path));
    }
    namespaces
}

fn extract_namespace(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawNamespace {
    let Some(entries) = ex.mapping(node, path, "namespace") else {
        return RawNamespace {
            name: ex.placeholder_scalar(node, path, invalid_placeholder("namespace")),
            interfaces: Vec::new(),
            classes: Vec::new(),
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, NAMESPACE_KEYS, path, "namespace");

    let name = ex.required_scalar(
        node,
        path,
        "namespaceName",
        "namespace",
        Shape::SimpleOrQualified,
    );

    let mut interfaces = Vec::new();
    if let Seq::Items(items) = ex.sequence(node, path, "interfaces") {
        for (i, item) in items.iter().enumerate() {
            interfaces.push(extract_interface(ex, item, &index_path(path, "interfaces", i)));
        }
    }

    let mut classes = Vec::new();
    if let Seq::Items(items) = ex.sequence(node, path, "classes") {
        for (i, item) in items.iter().enumerate() {
            classes.push(extract_class(ex, item, &index_path(path, "classes", i)));
        }
    }

    RawNamespace {
        name,
        interfaces,
        classes,
        placeholder: false,
        prov: ex.stack(node, path),
    }
}

fn extract_interface(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawInterface {
    let Some(entries) = ex.mapping(node, path, "interface") else {
        return RawInterface {
            name: ex.placeholder_scalar(node, path, invalid_placeholder("interface")),
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, INTERFACE_KEYS, path, "interface");
    RawInterface {
        name: ex.required_scalar(node, path, "interfaceName", "interface", Shape::Simple),
        placeholder: false,
        prov: ex.stack(node, path),
    }
}

fn extract_class(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawClass {
    let Some(entries) = ex.mapping(node, path, "class") else {
        return RawClass {
            name: ex.placeholder_scalar(node, path, invalid_placeholder("class")),
            qualified_interface: None,
            initializer_parameters: Some(Vec::new()),
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, CLASS_KEYS, path, "class");

    let name = ex.required_scalar(node, path, "className", "class", Shape::Simple);
    let qualified_interface =
        ex.optional_type_ref(node, path, "qualifiedInterfaceName", RefKind::BareInterface);

    let initializer_parameters = match ex.sequence(node, path, "initializerParameters") {
        Seq::Items(items) => {
            let mut params = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let param_path = index_path(path, "initializerParameters", i);
                params.push(extract_parameter(ex, item, &param_path));
            }
            Some(params)
        }
        Seq::Invalid => Some(Vec::new()),
        Seq::Absent => {
            let origin = ex.origin(node, &key_path(path, "initializerParameters"));
            ex.report(
                DiagnosticCode::MissingRequiredKey,
                "class is missing required key 'initializerParameters'",
                &origin,
            );
            None
        }
    };

    RawClass {
        name,
        qualified_interface,
        initializer_parameters,
        placeholder: false,
        prov: ex.stack(node, path),
    }
}

fn extract_parameter(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawParameter {
    let Some(entries) = ex.mapping(node, path, "initializer parameter") else {
        return RawParameter {
            name: ex.placeholder_scalar(node, path, invalid_placeholder("parameter")),
            class_ref: None,
            interface_ref: None,
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, PARAMETER_KEYS, path, "initializer parameter");

    let name = ex.required_scalar(node, path, "name", "initializer parameter", Shape::Simple);

    let mut class_ref = ex.optional_type_ref(node, path, "qualifiedClassName", RefKind::Class);
    let interface_ref =
        ex.optional_type_ref(node, path, "qualifiedInterfaceName", RefKind::Interface);
    // With both references present pass 3 reports the pair as one error.
    if let (Some(cref), None) = (class_ref.as_mut(), interface_ref.as_ref()) {
        let concrete = cref.text.is_valid()
            && cref.parsed.as_ref().is_some_and(|t| !t.is_primitive());
        if concrete {
            ex.report(
                DiagnosticCode::ParameterClassNotPrimitive,
                format!(
                    "parameter '{}' references concrete class '{}'; \
                     non-primitive parameters must reference an interface",
                    name.value, cref.text.value
                ),
                &cref.text.origin,
            );
            cref.text.status = FieldStatus::Malformed;
        }
    }

    RawParameter {
        name,
        class_ref,
        interface_ref,
        placeholder: false,
        prov: ex.stack(node, path),
    }
}
