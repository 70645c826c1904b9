//! Named instance, assignment and element extraction.

use super::{Extractor, RefKind, Seq, Shape};
use crate::diagnostic::DiagnosticCode;
use crate::node::Node;
use crate::provenance::{index_path, key_path, ROOT_PATH};
use crate::raw::*;

const NAMED_INSTANCE_KEYS: &[&str] = &[
    "namedInstanceName",
    "qualifiedClassName",
    "qualifiedInterfaceName",
    "assignments",
    "elements",
];
const ASSIGNMENT_KEYS: &[&str] = &["parameterName", "assignmentValue", "namedInstanceName"];
const ELEMENT_KEYS: &[&str] = &["assignmentValue", "namedInstanceName"];

pub(super) fn extract_named_instances(
    ex: &mut Extractor<'_>,
    root: &Node,
) -> Vec<RawNamedInstance> {
    let items = match ex.sequence(root, ROOT_PATH, "namedInstances") {
        Seq::Items(items) => items,
        Seq::Absent | Seq::Invalid => return Vec::new(),
    };
    let mut instances = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = index_path(ROOT_PATH, "namedInstances", i);
        instances.push(extract_named_instance(ex, item, &path));
    }
    instances
}

fn extract_named_instance(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawNamedInstance {
    let Some(entries) = ex.mapping(node, path, "named instance") else {
        let placeholder = ex.placeholder_scalar(node, path, invalid_placeholder("namedInstance"));
        return RawNamedInstance {
            name: placeholder.clone(),
            class_ref: RawTypeRef {
                text: placeholder,
                parsed: None,
            },
            interface_ref: None,
            assignments: None,
            elements: None,
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, NAMED_INSTANCE_KEYS, path, "named instance");

    let name = ex.required_scalar(node, path, "namedInstanceName", "named instance", Shape::Simple);
    let class_ref = ex.required_type_ref(
        node,
        path,
        "qualifiedClassName",
        "named instance",
        RefKind::Class,
    );
    let interface_ref =
        ex.optional_type_ref(node, path, "qualifiedInterfaceName", RefKind::Interface);

    let assignments = match ex.sequence(node, path, "assignments") {
        Seq::Items(items) => {
            if items.is_empty() {
                report_redundant(ex, node, path, "assignments");
            }
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(extract_assignment(ex, item, &index_path(path, "assignments", i)));
            }
            Some(out)
        }
        Seq::Absent | Seq::Invalid => None,
    };

    let elements = match ex.sequence(node, path, "elements") {
        Seq::Items(items) => {
            if items.is_empty() {
                report_redundant(ex, node, path, "elements");
            }
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(extract_element(ex, item, &index_path(path, "elements", i)));
            }
            Some(out)
        }
        Seq::Absent | Seq::Invalid => None,
    };

    RawNamedInstance {
        name,
        class_ref,
        interface_ref,
        assignments,
        elements,
        placeholder: false,
        prov: ex.stack(node, path),
    }
}

fn report_redundant(ex: &mut Extractor<'_>, node: &Node, path: &str, key: &str) {
    let list = node.get(key).unwrap_or(node);
    let origin = ex.origin(list, &key_path(path, key));
    ex.report(
        DiagnosticCode::RedundantEmptyList,
        format!("explicit empty '{}' list has no effect; omit the key instead", key),
        &origin,
    );
}

fn extract_assignment(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawAssignment {
    let Some(entries) = ex.mapping(node, path, "assignment") else {
        return RawAssignment {
            parameter_name: ex.placeholder_scalar(node, path, invalid_placeholder("assignment")),
            value: None,
            instance_ref: None,
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, ASSIGNMENT_KEYS, path, "assignment");

    RawAssignment {
        parameter_name: ex.required_scalar(
            node,
            path,
            "parameterName",
            "assignment",
            Shape::Simple,
        ),
        value: ex.optional_scalar(node, path, "assignmentValue", Shape::Text),
        instance_ref: ex.optional_scalar(node, path, "namedInstanceName", Shape::Simple),
        placeholder: false,
        prov: ex.stack(node, path),
    }
}

fn extract_element(ex: &mut Extractor<'_>, node: &Node, path: &str) -> RawElement {
    let Some(entries) = ex.mapping(node, path, "element") else {
        return RawElement {
            value: None,
            instance_ref: None,
            placeholder: true,
            prov: ex.stack(node, path),
        };
    };
    ex.check_keys(entries, ELEMENT_KEYS, path, "element");

    RawElement {
        value: ex.optional_scalar(node, path, "assignmentValue", Shape::Text),
        instance_ref: ex.optional_scalar(node, path, "namedInstanceName", Shape::Simple),
        placeholder: false,
        prov: ex.stack(node, path),
    }
}
