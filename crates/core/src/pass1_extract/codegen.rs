//! `codeGen` block extraction.

use super::{Extractor, Seq, Shape};
use crate::diagnostic::DiagnosticCode;
use crate::node::Node;
use crate::provenance::{index_path, key_path, ROOT_PATH};
use crate::raw::*;
use std::collections::HashSet;

const CODE_GEN_KEYS: &[&str] = &[
    "registryClassName",
    "generatedCodePath",
    "namespaceName",
    "initializerName",
    "packageReferences",
];

pub(super) fn extract_code_gen(ex: &mut Extractor<'_>, root: &Node) -> RawCodeGen {
    let path = key_path(ROOT_PATH, "codeGen");
    let node = match root.get("codeGen") {
        Some(node) => node,
        None => {
            let origin = ex.origin(root, &path);
            ex.report(
                DiagnosticCode::MissingRequiredKey,
                "document is missing required key 'codeGen'",
                &origin,
            );
            return placeholder_code_gen(ex, root, &path);
        }
    };
    let entries = match ex.mapping(node, &path, "codeGen") {
        Some(entries) => entries,
        None => return placeholder_code_gen(ex, node, &path),
    };
    ex.check_keys(entries, CODE_GEN_KEYS, &path, "codeGen");

    let registry_class_name =
        ex.required_scalar(node, &path, "registryClassName", "codeGen", Shape::Simple);
    let generated_code_path =
        ex.required_scalar(node, &path, "generatedCodePath", "codeGen", Shape::Text);
    let namespace_name = ex.required_scalar(
        node,
        &path,
        "namespaceName",
        "codeGen",
        Shape::SimpleOrQualified,
    );
    let initializer_name =
        ex.required_scalar(node, &path, "initializerName", "codeGen", Shape::Simple);
    let package_references = extract_package_references(ex, node, &path);

    RawCodeGen {
        registry_class_name,
        generated_code_path,
        namespace_name,
        initializer_name,
        package_references,
        placeholder: false,
        prov: ex.stack(node, &path),
    }
}

fn placeholder_code_gen(ex: &Extractor<'_>, node: &Node, path: &str) -> RawCodeGen {
    let field =
        |key: &str| ex.placeholder_scalar(node, &key_path(path, key), missing_placeholder(key));
    RawCodeGen {
        registry_class_name: field("registryClassName"),
        generated_code_path: field("generatedCodePath"),
        namespace_name: field("namespaceName"),
        initializer_name: field("initializerName"),
        package_references: Vec::new(),
        placeholder: true,
        prov: ex.stack(node, path),
    }
}

fn extract_package_references(ex: &mut Extractor<'_>, node: &Node, path: &str) -> Vec<RawScalar> {
    let items = match ex.sequence(node, path, "packageReferences") {
        Seq::Items(items) => items,
        Seq::Absent | Seq::Invalid => return Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut refs = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let item_path = index_path(path, "packageReferences", i);
        let origin = ex.origin(item, &item_path);
        let value = match item.as_scalar() {
            Some(v) if !super::is_null(v) => v.to_owned(),
            Some(_) => {
                ex.report(
                    DiagnosticCode::EmptyValue,
                    "package reference must not be empty",
                    &origin,
                );
                continue;
            }
            None => {
                ex.report(
                    DiagnosticCode::ExpectedScalar,
                    format!("package reference must be a scalar, found a {}", item.kind_name()),
                    &origin,
                );
                continue;
            }
        };
        if !seen.insert(value.clone()) {
            ex.report(
                DiagnosticCode::DuplicatePackageReference,
                format!("package reference '{}' is listed more than once", value),
                &origin,
            );
        }
        refs.push(RawScalar {
            value,
            origin,
            status: FieldStatus::Valid,
        });
    }
    refs
}
