//! Forward-reference ordering: an instance may only reference instances
//! declared before it.
//!
//! A reference cycle always contains at least one forward reference, so
//! cycles surface here without a separate graph walk.

use super::{is_checkable_reference, Scope};
use crate::canonical::Wiring;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};

pub(super) fn check_ordering(scope: &Scope<'_>, diags: &mut Diagnostics) {
    for (i, inst) in scope.model.named_instances.iter().enumerate() {
        if inst.is_placeholder() {
            continue;
        }
        for (wiring, provenance) in inst.wirings() {
            let Wiring::Instance(target) = wiring else {
                continue;
            };
            if !is_checkable_reference(target) {
                continue;
            }
            match scope.index.instance_position(target) {
                None => diags.push(Diagnostic::at(
                    DiagnosticCode::NamedInstanceMissing,
                    format!(
                        "named instance '{}' references '{}', which is not declared",
                        inst.name, target
                    ),
                    provenance,
                )),
                Some(j) if j >= i => diags.push(Diagnostic::at(
                    DiagnosticCode::DependencyOrderViolation,
                    format!(
                        "named instance '{}' references '{}', which is not declared before it",
                        inst.name, target
                    ),
                    provenance,
                )),
                Some(_) => {}
            }
        }
    }
}
