//! Reference resolution against declared classes and interfaces.

use super::{ref_ok, Scope};
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};

pub(super) fn check_references(scope: &Scope<'_>, diags: &mut Diagnostics) {
    check_class_interfaces(scope, diags);
    check_instance_types(scope, diags);
}

fn check_class_interfaces(scope: &Scope<'_>, diags: &mut Diagnostics) {
    for raw_ns in &scope.raw.namespaces {
        for raw_class in &raw_ns.classes {
            let Some(iface) = &raw_class.qualified_interface else {
                continue;
            };
            if !ref_ok(iface) {
                continue;
            }
            let base = iface.resolved().base;
            if !scope.index.has_interface(&base) {
                diags.push(Diagnostic::at_origin(
                    DiagnosticCode::UnresolvedInterface,
                    format!(
                        "class '{}' exposes interface '{}', which is not declared",
                        raw_class.name.value, base
                    ),
                    &iface.text.origin,
                ));
            }
        }
    }
}

fn check_instance_types(scope: &Scope<'_>, diags: &mut Diagnostics) {
    for (inst, raw) in scope.model.named_instances.iter().zip(&scope.raw.named_instances) {
        if inst.is_placeholder() {
            continue;
        }

        let class_type = &inst.class_type;
        if ref_ok(&raw.class_ref) && !class_type.is_primitive() {
            // An array may hold interface-typed elements.
            let declared = scope.index.has_class(&class_type.base)
                || (class_type.is_array && scope.index.has_interface(&class_type.base));
            if !declared {
                diags.push(Diagnostic::at_origin(
                    DiagnosticCode::UnresolvedClass,
                    format!(
                        "named instance '{}' uses class '{}', which is not declared",
                        inst.name, class_type.base
                    ),
                    &raw.class_ref.text.origin,
                ));
            }
        }

        let (Some(iface), Some(raw_iface)) = (&inst.interface_type, &raw.interface_ref) else {
            continue;
        };
        if !ref_ok(raw_iface) {
            continue;
        }
        if !scope.index.has_interface(&iface.base) {
            diags.push(Diagnostic::at_origin(
                DiagnosticCode::UnresolvedInterface,
                format!(
                    "named instance '{}' uses interface '{}', which is not declared",
                    inst.name, iface.base
                ),
                &raw_iface.text.origin,
            ));
            continue;
        }
        let Some(class) = scope.class(&class_type.base) else {
            continue;
        };
        let mismatch = match &class.qualified_interface_name {
            Some(exposed) if *exposed == iface.base => None,
            Some(exposed) => Some(format!(
                "class '{}' exposes '{}'",
                class.qualified_name, exposed
            )),
            None => Some(format!("class '{}' exposes no interface", class.qualified_name)),
        };
        if let Some(detail) = mismatch {
            diags.push(Diagnostic::at_origin(
                DiagnosticCode::InterfaceMismatch,
                format!(
                    "named instance '{}' declares interface '{}' but {}",
                    inst.name, iface.base, detail
                ),
                &raw_iface.text.origin,
            ));
        }
    }
}
