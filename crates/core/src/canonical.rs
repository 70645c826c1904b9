//! Canonical model: the strict, read-only output of the pipeline.
//!
//! Every "exactly one of" pair in the raw layer is a sum type here. Entities
//! whose raw input broke such a rule are still present, carrying a sentinel
//! variant and `is_valid == false`, so tooling can display the whole model.

use crate::diagnostic::{self, Diagnostic, Summary};
use crate::ident::{self, TypeRef};
use crate::provenance::ProvenanceStack;
use crate::raw::is_placeholder;

#[derive(Debug, Clone)]
pub struct Model {
    pub source: String,
    pub code_gen: CodeGenConfig,
    pub namespaces: Vec<Namespace>,
    pub named_instances: Vec<NamedInstance>,
    pub provenance: ProvenanceStack,
    /// Every diagnostic of the run, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Model {
    pub fn has_errors(&self) -> bool {
        diagnostic::has_errors(&self.diagnostics)
    }

    /// True when a renderer may run: no Error diagnostics.
    pub fn is_generatable(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> Summary {
        diagnostic::summarize(&self.diagnostics)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.namespaces.iter().flat_map(|ns| ns.classes.iter())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.namespaces.iter().flat_map(|ns| ns.interfaces.iter())
    }

    /// First class declared under `qualified_name`.
    pub fn class(&self, qualified_name: &str) -> Option<&Class> {
        self.classes().find(|c| c.qualified_name == qualified_name)
    }

    /// First named instance declared under `name`.
    pub fn named_instance(&self, name: &str) -> Option<&NamedInstance> {
        self.named_instances.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct CodeGenConfig {
    pub registry_class_name: String,
    pub generated_code_path: String,
    pub namespace_name: String,
    pub initializer_name: String,
    pub package_references: Vec<String>,
    pub provenance: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub interfaces: Vec<Interface>,
    pub classes: Vec<Class>,
    pub provenance: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub qualified_name: String,
    pub provenance: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub qualified_name: String,
    pub qualified_interface_name: Option<String>,
    /// The exposed interface when present, else the class's qualified name.
    pub effective_return_type: String,
    pub invoker_key: String,
    pub initializer_parameters: Vec<Parameter>,
    pub provenance: ProvenanceStack,
}

impl Class {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.initializer_parameters.iter().find(|p| p.name == name)
    }

    pub fn is_placeholder(&self) -> bool {
        is_placeholder(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    /// A primitive class reference.
    Class(TypeRef),
    Interface(TypeRef),
}

impl ParameterType {
    pub fn type_ref(&self) -> &TypeRef {
        match self {
            ParameterType::Class(t) | ParameterType::Interface(t) => t,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, ParameterType::Interface(_))
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_: ParameterType,
    pub is_valid: bool,
    pub provenance: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct NamedInstance {
    pub name: String,
    pub class_type: TypeRef,
    pub interface_type: Option<TypeRef>,
    pub initialization: Initialization,
    pub is_valid: bool,
    pub provenance: ProvenanceStack,
}

impl NamedInstance {
    /// Namespace of the target class; empty for primitives.
    pub fn namespace(&self) -> &str {
        ident::namespace_of(&self.class_type.base)
    }

    pub fn is_placeholder(&self) -> bool {
        is_placeholder(&self.name)
    }

    /// Every wiring of this instance, assignments and elements alike, with
    /// the provenance of the entry that holds it.
    pub fn wirings(&self) -> Vec<(&Wiring, &ProvenanceStack)> {
        match &self.initialization {
            Initialization::Default => Vec::new(),
            Initialization::Assignments(items) => {
                items.iter().map(|a| (&a.wiring, &a.provenance)).collect()
            }
            Initialization::Elements(items) => {
                items.iter().map(|e| (&e.wiring, &e.provenance)).collect()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Initialization {
    Default,
    Assignments(Vec<Assignment>),
    Elements(Vec<Element>),
}

impl Initialization {
    pub fn kind(&self) -> &'static str {
        match self {
            Initialization::Default => "default",
            Initialization::Assignments(_) => "assignments",
            Initialization::Elements(_) => "elements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wiring {
    /// A literal rendered verbatim.
    Value(String),
    /// The name of another named instance.
    Instance(String),
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub parameter_name: String,
    pub wiring: Wiring,
    pub is_valid: bool,
    pub provenance: ProvenanceStack,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub wiring: Wiring,
    pub is_valid: bool,
    pub provenance: ProvenanceStack,
}
