//! Wiring compatibility between assignments, elements and the parameters or
//! interfaces they feed.

use super::{is_checkable_reference, Scope};
use crate::canonical::*;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::ident::TypeRef;
use crate::raw::is_placeholder;
use std::collections::HashSet;

pub(super) fn check_wiring(scope: &Scope<'_>, diags: &mut Diagnostics) {
    for (i, inst) in scope.model.named_instances.iter().enumerate() {
        if inst.is_placeholder() {
            continue;
        }
        match &inst.initialization {
            Initialization::Assignments(items) => {
                if let Some(class) = scope.instance_class(i) {
                    check_assignments(scope, inst, class, items, diags);
                }
            }
            Initialization::Elements(items) => check_elements(scope, inst, items, diags),
            Initialization::Default => {}
        }
    }
}

fn check_assignments(
    scope: &Scope<'_>,
    inst: &NamedInstance,
    class: &Class,
    items: &[Assignment],
    diags: &mut Diagnostics,
) {
    let mut assigned: HashSet<&str> = HashSet::new();
    for a in items {
        if !is_checkable_reference(&a.parameter_name) {
            continue;
        }
        let Some(param) = class.parameter(&a.parameter_name) else {
            diags.push(Diagnostic::at(
                DiagnosticCode::UnknownInitializerParameter,
                format!(
                    "class '{}' has no initializer parameter '{}'",
                    class.qualified_name, a.parameter_name
                ),
                &a.provenance,
            ));
            continue;
        };
        if !assigned.insert(a.parameter_name.as_str()) {
            diags.push(Diagnostic::at(
                DiagnosticCode::DuplicateAssignment,
                format!(
                    "parameter '{}' of named instance '{}' is assigned more than once",
                    a.parameter_name, inst.name
                ),
                &a.provenance,
            ));
            continue;
        }

        match &param.type_ {
            ParameterType::Interface(expected) => {
                check_interface_wiring(scope, a, expected, diags);
            }
            // Concrete class parameters were already rejected in pass 1.
            ParameterType::Class(_) => {}
        }
    }

    for param in &class.initializer_parameters {
        if is_placeholder(&param.name) || assigned.contains(param.name.as_str()) {
            continue;
        }
        diags.push(Diagnostic::at(
            DiagnosticCode::UnassignedParameter,
            format!(
                "parameter '{}' of class '{}' is not assigned by named instance '{}'",
                param.name, class.qualified_name, inst.name
            ),
            &inst.provenance,
        ));
    }
}

fn check_interface_wiring(
    scope: &Scope<'_>,
    a: &Assignment,
    expected: &TypeRef,
    diags: &mut Diagnostics,
) {
    match &a.wiring {
        Wiring::Value(literal) => {
            if is_placeholder(literal) {
                return;
            }
            diags.push(Diagnostic::at(
                DiagnosticCode::LiteralForInterfaceParameter,
                format!(
                    "parameter '{}' expects interface '{}' but is assigned the literal '{}'",
                    a.parameter_name, expected, literal
                ),
                &a.provenance,
            ));
        }
        Wiring::Instance(target) => {
            let Some(target_inst) = scope.instance(target) else {
                return;
            };
            if scope.exposed_interface(target_inst) != Some(expected.base.as_str()) {
                diags.push(Diagnostic::at(
                    DiagnosticCode::NamedInstanceNotExposingInterface,
                    format!(
                        "named instance '{}' does not expose '{}' required by parameter '{}'",
                        target, expected.base, a.parameter_name
                    ),
                    &a.provenance,
                ));
            }
        }
    }
}

/// The interface every element must expose: the declared interface array,
/// else a class reference that itself names an interface array.
fn element_interface<'m>(scope: &Scope<'m>, inst: &'m NamedInstance) -> Option<&'m TypeRef> {
    match inst.interface_type.as_ref() {
        Some(t) if t.is_array => Some(t),
        Some(_) => None,
        None => Some(&inst.class_type)
            .filter(|t| t.is_array && scope.index.has_interface(&t.base)),
    }
}

fn check_elements(
    scope: &Scope<'_>,
    inst: &NamedInstance,
    items: &[Element],
    diags: &mut Diagnostics,
) {
    let Some(iface) = element_interface(scope, inst) else {
        return;
    };
    for e in items {
        let Wiring::Instance(target) = &e.wiring else {
            continue;
        };
        if !is_checkable_reference(target) {
            continue;
        }
        let Some(target_inst) = scope.instance(target) else {
            continue;
        };
        if scope.exposed_interface(target_inst) != Some(iface.base.as_str()) {
            diags.push(Diagnostic::at(
                DiagnosticCode::NamedInstanceNotExposingInterface,
                format!(
                    "element of '{}' references '{}', which does not expose '{}'",
                    inst.name, target, iface.base
                ),
                &e.provenance,
            ));
        }
    }
}
