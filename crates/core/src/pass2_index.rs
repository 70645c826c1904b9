//! Pass 2: Declaration indexing -- lookup tables over the raw model.
//!
//! Positions refer to the raw author order. Pass 3 keeps that order one to
//! one, so the same positions address the canonical model. The first
//! declaration of a name wins; pass 4 reports the repeats.

use crate::ident::qualify;
use crate::raw::*;
use std::collections::HashMap;

/// A lookup index over the raw model, built in Pass 2.
#[derive(Debug, Default)]
pub struct Index {
    /// Qualified class name -> (namespace position, class position)
    pub classes: HashMap<String, (usize, usize)>,
    /// Qualified interface name -> (namespace position, interface position)
    pub interfaces: HashMap<String, (usize, usize)>,
    /// Named instance name -> position of its first declaration
    pub instances: HashMap<String, usize>,
}

impl Index {
    pub fn has_class(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    pub fn has_interface(&self, qualified_name: &str) -> bool {
        self.interfaces.contains_key(qualified_name)
    }

    pub fn instance_position(&self, name: &str) -> Option<usize> {
        self.instances.get(name).copied()
    }
}

pub fn build_index(raw: &RawModel) -> Index {
    let mut idx = Index::default();

    for (n, ns) in raw.namespaces.iter().enumerate() {
        if ns.placeholder || is_placeholder(&ns.name.value) {
            continue;
        }
        for (i, iface) in ns.interfaces.iter().enumerate() {
            if iface.placeholder || is_placeholder(&iface.name.value) {
                continue;
            }
            idx.interfaces
                .entry(qualify(&ns.name.value, &iface.name.value))
                .or_insert((n, i));
        }
        for (c, class) in ns.classes.iter().enumerate() {
            if class.placeholder || is_placeholder(&class.name.value) {
                continue;
            }
            idx.classes
                .entry(qualify(&ns.name.value, &class.name.value))
                .or_insert((n, c));
        }
    }

    for (i, inst) in raw.named_instances.iter().enumerate() {
        if inst.placeholder || is_placeholder(&inst.name.value) {
            continue;
        }
        idx.instances.entry(inst.name.value.clone()).or_insert(i);
    }

    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Diagnostics;
    use crate::node::Node;
    use crate::pass1_extract::extract;
    use crate::provenance::{ProvenanceContext, Stage};
    use time::OffsetDateTime;

    fn index(yaml: &str) -> Index {
        let root = Node::from_yaml_str(yaml).unwrap();
        let ctx = ProvenanceContext::new(Stage::Extract, "test", OffsetDateTime::UNIX_EPOCH);
        let mut diags = Diagnostics::new();
        let raw = extract(&root, "doc.yaml", &ctx, &mut diags).unwrap();
        build_index(&raw)
    }

    #[test]
    fn first_declaration_wins() {
        let idx = index(
            "namedInstances:\n  - namedInstanceName: A\n    qualifiedClassName: App.X\n  - namedInstanceName: B\n    qualifiedClassName: App.X\n  - namedInstanceName: A\n    qualifiedClassName: App.Y\n",
        );
        assert_eq!(idx.instance_position("A"), Some(0));
        assert_eq!(idx.instance_position("B"), Some(1));
        assert_eq!(idx.instance_position("C"), None);
    }

    #[test]
    fn types_are_indexed_by_qualified_name() {
        let idx = index(
            "namespaces:\n  - namespaceName: App.Core\n    interfaces:\n      - interfaceName: ILogger\n    classes:\n      - className: FileLogger\n        initializerParameters: []\n  - namespaceName: Other\n    classes:\n      - oops\n",
        );
        assert_eq!(idx.interfaces.get("App.Core.ILogger"), Some(&(0, 0)));
        assert!(idx.has_class("App.Core.FileLogger"));
        assert!(!idx.has_class("App.Core.ILogger"));
        assert_eq!(idx.classes.len(), 1);
    }
}
