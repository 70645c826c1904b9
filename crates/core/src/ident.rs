//! Identifier and type-reference grammar.
//!
//! Pure functions over name shapes. Nothing in here records diagnostics;
//! callers decide which code to emit when a check fails.

use std::fmt;

/// Reserved words of the generated target language. A simple identifier may
/// not collide with any of these.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const PRIMITIVE_KEYWORDS: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort", "string", "object",
];

const PRIMITIVE_ALIASES: &[&str] = &[
    "System.Boolean",
    "System.Byte",
    "System.SByte",
    "System.Char",
    "System.Decimal",
    "System.Double",
    "System.Single",
    "System.Int32",
    "System.UInt32",
    "System.IntPtr",
    "System.UIntPtr",
    "System.Int64",
    "System.UInt64",
    "System.Int16",
    "System.UInt16",
    "System.String",
    "System.Object",
];

pub fn is_reserved(s: &str) -> bool {
    RESERVED_WORDS.contains(&s)
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding reserved words.
pub fn is_simple_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_reserved(s)
}

/// Dot-joined simple identifiers with at least one dot.
pub fn is_qualified_name(s: &str) -> bool {
    s.contains('.') && s.split('.').all(is_simple_identifier)
}

pub fn is_simple_or_qualified(s: &str) -> bool {
    is_simple_identifier(s) || is_qualified_name(s)
}

pub fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Interface short names are `I` followed by an uppercase letter.
pub fn is_interface_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    is_simple_identifier(s)
        && bytes.first() == Some(&b'I')
        && bytes.get(1).is_some_and(|b| b.is_ascii_uppercase())
}

pub fn is_primitive(s: &str) -> bool {
    PRIMITIVE_KEYWORDS.contains(&s) || PRIMITIVE_ALIASES.contains(&s)
}

/// Everything before the last dot; empty for a simple name.
pub fn namespace_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("")
}

pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Deterministic identifier-safe token for a qualified class name.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, and a leading digit
/// is prefixed with `_`. The result is not guaranteed to be unique: `A.B_C`
/// and `A_B.C` map to the same key, which pass 4 reports.
pub fn invoker_key(qualified_name: &str) -> String {
    let mut key: String = qualified_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

// ──────────────────────────────────────────────
// Type references
// ──────────────────────────────────────────────

/// A parsed type token: `Base`, `Base?`, `Base[]` or `Base[]?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub base: String,
    pub is_array: bool,
    pub is_container_nullable: bool,
    pub is_element_nullable: bool,
}

impl TypeRef {
    /// A plain reference with no modifiers. Used for placeholders.
    pub fn named(base: impl Into<String>) -> Self {
        TypeRef {
            base: base.into(),
            is_array: false,
            is_container_nullable: false,
            is_element_nullable: false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        is_primitive(&self.base)
    }

    pub fn has_modifiers(&self) -> bool {
        self.is_array || self.is_container_nullable || self.is_element_nullable
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if self.is_element_nullable {
            f.write_str("?")?;
        }
        if self.is_array {
            f.write_str("[]")?;
        }
        if self.is_container_nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeRefError {
    #[error("type reference is empty")]
    Empty,
    #[error("'{0}' declares nullable elements inside an array, which is not supported")]
    NullableElementArray(String),
    #[error("'{0}' has malformed type modifiers")]
    MalformedModifiers(String),
    #[error("'{0}' is not a valid type name")]
    InvalidBase(String),
}

/// Parse a type token of the form `Base ['?'] ['[]'] ['?']`.
///
/// `Base?[]` (nullable element inside an array) is rejected with
/// [`TypeRefError::NullableElementArray`] rather than parsed.
pub fn parse_type_ref(token: &str) -> Result<TypeRef, TypeRefError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TypeRefError::Empty);
    }

    let mut rest = token;
    let mut is_array = false;
    let mut is_container_nullable = false;
    let mut is_element_nullable = false;

    if let Some(r) = rest.strip_suffix("[]?") {
        is_array = true;
        is_container_nullable = true;
        rest = r;
    } else if let Some(r) = rest.strip_suffix("[]") {
        is_array = true;
        rest = r;
    }

    if is_array {
        if rest.ends_with('?') {
            return Err(TypeRefError::NullableElementArray(token.to_owned()));
        }
    } else if let Some(r) = rest.strip_suffix('?') {
        is_element_nullable = true;
        rest = r;
    }

    if rest.is_empty() || rest.contains(|c: char| matches!(c, '?' | '[' | ']')) {
        return Err(TypeRefError::MalformedModifiers(token.to_owned()));
    }
    if !(is_primitive(rest) || is_simple_or_qualified(rest)) {
        return Err(TypeRefError::InvalidBase(rest.to_owned()));
    }

    Ok(TypeRef {
        base: rest.to_owned(),
        is_array,
        is_container_nullable,
        is_element_nullable,
    })
}
