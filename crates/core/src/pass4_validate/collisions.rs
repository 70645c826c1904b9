//! Name collision checks for types and named instances.

use super::Scope;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::provenance::ProvenanceStack;
use crate::raw::is_placeholder;
use std::collections::HashMap;

struct TypeEntry<'m> {
    namespace: &'m str,
    name: &'m str,
    kind: &'static str,
    qualified_name: &'m str,
    provenance: &'m ProvenanceStack,
}

pub(super) fn check_collisions(scope: &Scope<'_>, diags: &mut Diagnostics) {
    check_type_collisions(scope, diags);
    check_instance_collisions(scope, diags);
}

fn check_type_collisions(scope: &Scope<'_>, diags: &mut Diagnostics) {
    let mut entries = Vec::new();
    for ns in &scope.model.namespaces {
        if is_placeholder(&ns.name) {
            continue;
        }
        for iface in ns.interfaces.iter().filter(|i| !is_placeholder(&i.name)) {
            entries.push(TypeEntry {
                namespace: &ns.name,
                name: &iface.name,
                kind: "interface",
                qualified_name: &iface.qualified_name,
                provenance: &iface.provenance,
            });
        }
        for class in ns.classes.iter().filter(|c| !c.is_placeholder()) {
            entries.push(TypeEntry {
                namespace: &ns.name,
                name: &class.name,
                kind: "class",
                qualified_name: &class.qualified_name,
                provenance: &class.provenance,
            });
        }
    }

    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for e in &entries {
        *counts.entry((e.namespace, e.name)).or_insert(0) += 1;
    }
    for e in &entries {
        let count = counts[&(e.namespace, e.name)];
        if count > 1 {
            diags.push(Diagnostic::at(
                DiagnosticCode::DuplicateTypeIdentifier,
                format!(
                    "{} '{}' shares its name with {} other type(s) in namespace '{}'",
                    e.kind,
                    e.qualified_name,
                    count - 1,
                    e.namespace
                ),
                e.provenance,
            ));
        }
    }
}

fn check_instance_collisions(scope: &Scope<'_>, diags: &mut Diagnostics) {
    let instances: Vec<_> = scope
        .model
        .named_instances
        .iter()
        .filter(|i| !i.is_placeholder())
        .collect();

    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for inst in &instances {
        *counts.entry((inst.namespace(), inst.name.as_str())).or_insert(0) += 1;
    }
    for inst in &instances {
        if counts[&(inst.namespace(), inst.name.as_str())] > 1 {
            diags.push(Diagnostic::at(
                DiagnosticCode::DuplicateNamedInstance,
                format!(
                    "named instance '{}' is declared more than once for namespace '{}'",
                    inst.name,
                    inst.namespace()
                ),
                &inst.provenance,
            ));
        }
    }
}
