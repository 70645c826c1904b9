//! Generic node tree consumed by pass 1.
//!
//! Any notation that can produce Mapping / Sequence / Scalar nodes with a
//! position can drive the pipeline. YAML (through `marked-yaml`, which keeps
//! source markers) and JSON (through `serde_json`) adapters live here.

use serde_json::Value;

/// Zero-based source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: Option<u32>,
}

impl Position {
    pub fn new(line: u32, column: Option<u32>) -> Self {
        Position { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Ordered key/value pairs, as authored.
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
}

/// The tree parser rejected the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("{0}")]
    Malformed(String),
    /// The YAML loader refuses a non-mapping root before building any node.
    #[error("document root must be a mapping")]
    RootNotMapping(Position),
}

impl Node {
    pub fn mapping(entries: Vec<(String, Node)>, position: Position) -> Self {
        Node {
            kind: NodeKind::Mapping(entries),
            position,
        }
    }

    pub fn sequence(items: Vec<Node>, position: Position) -> Self {
        Node {
            kind: NodeKind::Sequence(items),
            position,
        }
    }

    pub fn scalar(value: impl Into<String>, position: Position) -> Self {
        Node {
            kind: NodeKind::Scalar(value.into()),
            position,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Scalar(_) => "scalar",
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, Node)]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// First value for `key` in a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Parse YAML text into a node tree.
    pub fn from_yaml_str(text: &str) -> Result<Node, SyntaxError> {
        match marked_yaml::parse_yaml(0, text) {
            Ok(root) => Ok(convert_marked(&root)),
            Err(marked_yaml::LoadError::TopLevelMustBeMapping(m)) => {
                Err(SyntaxError::RootNotMapping(marker_position(&m)))
            }
            Err(e) => Err(SyntaxError::Malformed(e.to_string())),
        }
    }

    /// Convert a JSON value. JSON carries no positions, so every node sits at
    /// line 0. Numbers and booleans become their scalar text; null becomes
    /// the empty scalar.
    pub fn from_json(value: &Value) -> Node {
        let position = Position::default();
        match value {
            Value::Object(map) => Node::mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from_json(v)))
                    .collect(),
                position,
            ),
            Value::Array(items) => {
                Node::sequence(items.iter().map(Node::from_json).collect(), position)
            }
            Value::String(s) => Node::scalar(s.clone(), position),
            Value::Null => Node::scalar("", position),
            Value::Bool(b) => Node::scalar(b.to_string(), position),
            Value::Number(n) => Node::scalar(n.to_string(), position),
        }
    }
}

fn marked_position(span: &marked_yaml::Span) -> Position {
    span.start().map(marker_position).unwrap_or_default()
}

// marked-yaml markers are 1-based
fn marker_position(m: &marked_yaml::Marker) -> Position {
    Position::new(
        m.line().saturating_sub(1) as u32,
        Some(m.column().saturating_sub(1) as u32),
    )
}

fn convert_marked(node: &marked_yaml::Node) -> Node {
    let position = marked_position(node.span());
    match node {
        marked_yaml::Node::Scalar(s) => Node::scalar(s.as_str(), position),
        marked_yaml::Node::Sequence(items) => {
            Node::sequence(items.iter().map(convert_marked).collect(), position)
        }
        marked_yaml::Node::Mapping(map) => Node::mapping(
            map.iter()
                .map(|(k, v)| (k.as_str().to_owned(), convert_marked(v)))
                .collect(),
            position,
        ),
    }
}
