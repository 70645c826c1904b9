//! Pass 5: Interchange JSON serialization -- the canonical model as a
//! deterministic document for external renderers.
//!
//! Object keys are sorted (serde_json's default map), entity order is the
//! author order, and timestamps are RFC 3339 strings.

use crate::canonical::*;
use crate::diagnostic::Diagnostic;
use crate::ident::TypeRef;
use crate::provenance::ProvenanceStack;
use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;

pub fn serialize(model: &Model) -> Value {
    let mut doc = Map::new();
    doc.insert("codeGen".to_owned(), serialize_code_gen(&model.code_gen));
    doc.insert(
        "diagnostics".to_owned(),
        Value::Array(model.diagnostics.iter().map(serialize_diagnostic).collect()),
    );
    doc.insert("kind".to_owned(), Value::String("WiringModel".to_owned()));
    doc.insert(
        "namedInstances".to_owned(),
        Value::Array(model.named_instances.iter().map(serialize_named_instance).collect()),
    );
    doc.insert(
        "namespaces".to_owned(),
        Value::Array(model.namespaces.iter().map(serialize_namespace).collect()),
    );
    doc.insert("provenance".to_owned(), serialize_provenance(&model.provenance));
    doc.insert("source".to_owned(), Value::String(model.source.clone()));
    doc.insert(
        "version".to_owned(),
        Value::String(crate::WIRING_MODEL_VERSION.to_owned()),
    );
    Value::Object(doc)
}

/// Diagnostics alone, in the same shape as the `diagnostics` array.
pub fn serialize_diagnostics(diagnostics: &[Diagnostic]) -> Value {
    Value::Array(diagnostics.iter().map(serialize_diagnostic).collect())
}

fn serialize_code_gen(c: &CodeGenConfig) -> Value {
    json!({
        "generatedCodePath": c.generated_code_path,
        "initializerName": c.initializer_name,
        "namespaceName": c.namespace_name,
        "packageReferences": c.package_references,
        "provenance": serialize_provenance(&c.provenance),
        "registryClassName": c.registry_class_name,
    })
}

fn serialize_namespace(ns: &Namespace) -> Value {
    let interfaces: Vec<Value> = ns
        .interfaces
        .iter()
        .map(|i| {
            json!({
                "interfaceName": i.name,
                "provenance": serialize_provenance(&i.provenance),
                "qualifiedName": i.qualified_name,
            })
        })
        .collect();
    let classes: Vec<Value> = ns.classes.iter().map(serialize_class).collect();
    json!({
        "classes": classes,
        "interfaces": interfaces,
        "namespaceName": ns.name,
        "provenance": serialize_provenance(&ns.provenance),
    })
}

fn serialize_class(c: &Class) -> Value {
    let params: Vec<Value> = c
        .initializer_parameters
        .iter()
        .map(|p| {
            let kind = if p.type_.is_interface() { "interface" } else { "class" };
            json!({
                "isValid": p.is_valid,
                "kind": kind,
                "name": p.name,
                "provenance": serialize_provenance(&p.provenance),
                "type": serialize_type_ref(p.type_.type_ref()),
            })
        })
        .collect();
    json!({
        "className": c.name,
        "effectiveReturnType": c.effective_return_type,
        "initializerParameters": params,
        "invokerKey": c.invoker_key,
        "provenance": serialize_provenance(&c.provenance),
        "qualifiedInterfaceName": c.qualified_interface_name,
        "qualifiedName": c.qualified_name,
    })
}

fn serialize_named_instance(inst: &NamedInstance) -> Value {
    let mut init = Map::new();
    init.insert("kind".to_owned(), Value::String(inst.initialization.kind().to_owned()));
    match &inst.initialization {
        Initialization::Default => {}
        Initialization::Assignments(items) => {
            let assignments: Vec<Value> = items
                .iter()
                .map(|a| {
                    json!({
                        "isValid": a.is_valid,
                        "parameterName": a.parameter_name,
                        "provenance": serialize_provenance(&a.provenance),
                        "wiring": serialize_wiring(&a.wiring),
                    })
                })
                .collect();
            init.insert("assignments".to_owned(), Value::Array(assignments));
        }
        Initialization::Elements(items) => {
            let elements: Vec<Value> = items
                .iter()
                .map(|e| {
                    json!({
                        "isValid": e.is_valid,
                        "provenance": serialize_provenance(&e.provenance),
                        "wiring": serialize_wiring(&e.wiring),
                    })
                })
                .collect();
            init.insert("elements".to_owned(), Value::Array(elements));
        }
    }

    json!({
        "classType": serialize_type_ref(&inst.class_type),
        "initialization": Value::Object(init),
        "interfaceType": inst.interface_type.as_ref().map(serialize_type_ref),
        "isValid": inst.is_valid,
        "namedInstanceName": inst.name,
        "provenance": serialize_provenance(&inst.provenance),
    })
}

fn serialize_wiring(w: &Wiring) -> Value {
    match w {
        Wiring::Value(v) => json!({ "kind": "value", "value": v }),
        Wiring::Instance(name) => json!({ "kind": "instance", "namedInstanceName": name }),
    }
}

fn serialize_type_ref(t: &TypeRef) -> Value {
    json!({
        "base": t.base,
        "isArray": t.is_array,
        "isContainerNullable": t.is_container_nullable,
        "isElementNullable": t.is_element_nullable,
        "token": t.to_string(),
    })
}

fn serialize_diagnostic(d: &Diagnostic) -> Value {
    // Strings and integers only; serializing cannot fail.
    serde_json::to_value(d).unwrap_or_default()
}

fn serialize_provenance(stack: &ProvenanceStack) -> Value {
    let entries: Vec<Value> = stack
        .entries()
        .map(|e| {
            json!({
                "column": e.origin.column,
                "line": e.origin.line,
                "path": e.origin.path,
                "source": e.origin.source,
                "stage": e.stage.as_str(),
                // Rfc3339 only fails for offsets with seconds, which a run clock never has.
                "timestamp": e.timestamp.format(&Rfc3339).unwrap_or_default(),
                "tool": e.tool,
            })
        })
        .collect();
    json!({
        "entries": entries,
        "formatVersion": stack.format_version(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{compile_str, CompileOptions};
    use time::macros::datetime;

    fn options() -> CompileOptions {
        CompileOptions::fixed(datetime!(2024-05-01 12:00:00 UTC))
    }

    const DOC: &str = "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App.Generated\n  initializerName: Initialize\n  packageReferences:\n    - Serilog\nnamespaces:\n  - namespaceName: App\n    interfaces:\n      - interfaceName: ILogger\n    classes:\n      - className: FileLogger\n        qualifiedInterfaceName: App.ILogger\n        initializerParameters:\n          - name: path\n            qualifiedClassName: string\nnamedInstances:\n  - namedInstanceName: Log\n    qualifiedClassName: App.FileLogger\n    assignments:\n      - parameterName: path\n        assignmentValue: app.log\n";

    #[test]
    fn document_header_and_counts() {
        let model = compile_str(DOC, "wiring.yaml", &options());
        assert!(model.diagnostics.is_empty());
        let doc = serialize(&model);
        assert_eq!(doc["kind"], "WiringModel");
        assert_eq!(doc["version"], crate::WIRING_MODEL_VERSION);
        assert_eq!(doc["source"], "wiring.yaml");
        assert_eq!(doc["codeGen"]["packageReferences"], json!(["Serilog"]));
        assert_eq!(doc["namespaces"][0]["classes"][0]["invokerKey"], "App_FileLogger");
        assert_eq!(
            doc["namespaces"][0]["classes"][0]["effectiveReturnType"],
            "App.ILogger"
        );
    }

    #[test]
    fn wiring_and_provenance_shape() {
        let doc = serialize(&compile_str(DOC, "wiring.yaml", &options()));
        let inst = &doc["namedInstances"][0];
        assert_eq!(inst["initialization"]["kind"], "assignments");
        assert_eq!(
            inst["initialization"]["assignments"][0]["wiring"],
            json!({ "kind": "value", "value": "app.log" })
        );
        assert_eq!(inst["interfaceType"], Value::Null);
        assert_eq!(inst["classType"]["token"], "App.FileLogger");

        let entries = inst["provenance"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["stage"], "extract");
        assert_eq!(entries[1]["stage"], "transform");
        assert_eq!(entries[0]["path"], "namedInstances[0]");
        assert_eq!(entries[0]["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn diagnostics_are_serialized_in_order() {
        let text = "codeGen:\n  registryClassName: Registry\n  generatedCodePath: Generated\n  namespaceName: App\n  initializerName: Initialize\nnamespaces:\n  - namespaceName: Empty\n";
        let doc = serialize(&compile_str(text, "w.yaml", &options()));
        let diags = doc["diagnostics"].as_array().unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0]["code"], "EmptyNamespace");
        assert_eq!(diags[0]["severity"], "Info");
        assert_eq!(diags[0]["location"], "w.yaml#namespaces[0]");
        assert_eq!(diags[0]["line"], 6);
    }
}
