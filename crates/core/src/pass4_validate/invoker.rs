//! Invoker key checks.

use super::Scope;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::ident;
use crate::raw::is_placeholder;
use std::collections::{BTreeSet, HashMap};

pub(super) fn check_invoker_keys(scope: &Scope<'_>, diags: &mut Diagnostics) {
    let classes: Vec<_> = scope
        .model
        .namespaces
        .iter()
        .filter(|ns| !is_placeholder(&ns.name))
        .flat_map(|ns| ns.classes.iter())
        .filter(|c| !c.is_placeholder())
        .collect();

    // Repeated qualified names are collisions, reported earlier; only distinct
    // names mapping onto one key count here.
    let mut owners: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for class in &classes {
        owners
            .entry(class.invoker_key.as_str())
            .or_default()
            .insert(class.qualified_name.as_str());
    }

    for class in &classes {
        let sharing = &owners[class.invoker_key.as_str()];
        if sharing.len() > 1 {
            let others: Vec<&str> = sharing
                .iter()
                .copied()
                .filter(|q| *q != class.qualified_name)
                .collect();
            diags.push(Diagnostic::at(
                DiagnosticCode::DuplicateInvokerKey,
                format!(
                    "invoker key '{}' of class '{}' is also produced by {}",
                    class.invoker_key,
                    class.qualified_name,
                    others.join(", ")
                ),
                &class.provenance,
            ));
        }
        if !ident::is_simple_identifier(&class.invoker_key) {
            diags.push(Diagnostic::at(
                DiagnosticCode::InvalidInvokerKey,
                format!(
                    "invoker key '{}' of class '{}' is not a valid identifier",
                    class.invoker_key, class.qualified_name
                ),
                &class.provenance,
            ));
        }
    }
}
