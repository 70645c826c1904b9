//! Provenance: where a value came from and which pipeline stage touched it.
//!
//! Every raw and canonical entity carries a [`ProvenanceStack`]. Stacks are
//! non-empty by construction, so diagnostics can always cite a location.

use time::OffsetDateTime;

/// Format version stamped on every stack.
pub const PROVENANCE_FORMAT_VERSION: u32 = 1;

/// Logical path of the document root.
pub const ROOT_PATH: &str = "$";

/// Path used for synthetic origins.
pub const UNKNOWN_PATH: &str = "<unknown>";

/// Append a mapping key to a logical path.
pub fn key_path(parent: &str, key: &str) -> String {
    if parent == ROOT_PATH {
        key.to_owned()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Append an indexed sequence entry to a logical path: `parent.key[i]`.
pub fn index_path(parent: &str, key: &str, index: usize) -> String {
    format!("{}[{}]", key_path(parent, key), index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceOrigin {
    pub source: String,
    /// Zero-based.
    pub line: u32,
    /// Zero-based, when the tree parser reports one.
    pub column: Option<u32>,
    pub path: String,
}

impl ProvenanceOrigin {
    pub fn new(source: &str, line: u32, column: Option<u32>, path: impl Into<String>) -> Self {
        ProvenanceOrigin {
            source: source.to_owned(),
            line,
            column,
            path: path.into(),
        }
    }

    /// A synthetic origin for values with no real source position.
    pub fn unknown(source: &str) -> Self {
        ProvenanceOrigin::new(source, 0, None, UNKNOWN_PATH)
    }

    /// `{source}#{path}`
    pub fn location(&self) -> String {
        format!("{}#{}", self.source, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Transform,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Transform => "transform",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceEntry {
    pub origin: ProvenanceOrigin,
    pub stage: Stage,
    pub tool: String,
    pub timestamp: OffsetDateTime,
}

/// An ordered, non-empty sequence of provenance entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceStack {
    first: ProvenanceEntry,
    rest: Vec<ProvenanceEntry>,
    format_version: u32,
}

impl ProvenanceStack {
    pub fn new(first: ProvenanceEntry) -> Self {
        ProvenanceStack {
            first,
            rest: Vec::new(),
            format_version: PROVENANCE_FORMAT_VERSION,
        }
    }

    /// The most recent entry.
    pub fn latest(&self) -> &ProvenanceEntry {
        self.rest.last().unwrap_or(&self.first)
    }

    pub fn origin(&self) -> &ProvenanceOrigin {
        &self.latest().origin
    }

    pub fn location(&self) -> String {
        self.origin().location()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ProvenanceEntry> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false; present so `len` has its usual companion.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// A new stack with `entry` appended. The receiver is left untouched.
    pub fn with_entry(&self, entry: ProvenanceEntry) -> Self {
        let mut next = self.clone();
        next.rest.push(entry);
        next
    }
}

/// Stamps provenance for one stage of one pipeline run.
#[derive(Debug, Clone)]
pub struct ProvenanceContext {
    stage: Stage,
    tool: String,
    timestamp: OffsetDateTime,
}

impl ProvenanceContext {
    pub fn new(stage: Stage, tool: &str, timestamp: OffsetDateTime) -> Self {
        ProvenanceContext {
            stage,
            tool: tool.to_owned(),
            timestamp,
        }
    }

    /// The same tool and timestamp, stamped for a different stage.
    pub fn for_stage(&self, stage: Stage) -> Self {
        ProvenanceContext {
            stage,
            tool: self.tool.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn entry(&self, origin: ProvenanceOrigin) -> ProvenanceEntry {
        ProvenanceEntry {
            origin,
            stage: self.stage,
            tool: self.tool.clone(),
            timestamp: self.timestamp,
        }
    }

    /// A one-entry stack for `origin`.
    pub fn make(&self, origin: ProvenanceOrigin) -> ProvenanceStack {
        ProvenanceStack::new(self.entry(origin))
    }

    /// `stack` plus one entry for this stage at the stack's latest origin.
    pub fn extend(&self, stack: &ProvenanceStack) -> ProvenanceStack {
        stack.with_entry(self.entry(stack.origin().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(stage: Stage) -> ProvenanceContext {
        ProvenanceContext::new(stage, "wiregen/test", OffsetDateTime::UNIX_EPOCH)
    }

    #[test]
    fn paths_compose_from_root() {
        assert_eq!(key_path(ROOT_PATH, "codeGen"), "codeGen");
        assert_eq!(index_path(ROOT_PATH, "namespaces", 0), "namespaces[0]");
        assert_eq!(
            index_path("namespaces[0]", "classes", 2),
            "namespaces[0].classes[2]"
        );
    }

    #[test]
    fn extend_keeps_origin_and_appends_stage() {
        let origin = ProvenanceOrigin::new("wiring.yaml", 4, Some(2), "namespaces[0]");
        let raw = ctx(Stage::Extract).make(origin.clone());
        let canonical = ctx(Stage::Transform).extend(&raw);

        assert_eq!(raw.len(), 1);
        assert_eq!(canonical.len(), 2);
        assert_eq!(canonical.latest().stage, Stage::Transform);
        assert_eq!(canonical.origin(), &origin);
        assert_eq!(canonical.location(), "wiring.yaml#namespaces[0]");
        let stages: Vec<Stage> = canonical.entries().map(|e| e.stage).collect();
        assert_eq!(stages, vec![Stage::Extract, Stage::Transform]);
    }

    #[test]
    fn unknown_origin_still_has_a_location() {
        let stack = ctx(Stage::Extract).make(ProvenanceOrigin::unknown("mem"));
        assert_eq!(stack.location(), "mem#<unknown>");
        assert_eq!(stack.format_version(), PROVENANCE_FORMAT_VERSION);
    }
}
