//! Schema derivation without runtime reflection.
//!
//! Rust has no analogue of Python's `inspect.signature` +
//! `get_type_hints`, so `FunctionTool` construction is handed an explicit
//! `ParamSpec` list instead of a callable to introspect. The type-mapping
//! table and the "required iff no default" rule mirror the original
//! `generate_input_schema` one-to-one.

use serde_json::{Value, json};

/// A parameter's JSON Schema type, the Rust analogue of
/// `get_json_type`'s Python type dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    fn json_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }
}

/// One function parameter: name, type, and whether a default exists.
/// `has_default = false` means the parameter is required, matching the
/// "no default ⇒ required" rule.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub has_default: bool,
    pub description: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty, has_default: false, description: None }
    }

    pub const fn optional(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty, has_default: true, description: None }
    }

    pub const fn described(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Build a JSON Schema object from a parameter list. Parameters named
/// `self`, `cls`, or variadic are simply never included in the caller's
/// `ParamSpec` list (there is no reflection step to skip them during).
pub fn generate_input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in params {
        let mut prop = json!({ "type": param.ty.json_type() });
        if let Some(description) = param.description {
            prop["description"] = json!(description);
        }
        properties.insert(param.name.to_string(), prop);

        if !param.has_default {
            required.push(param.name.to_string());
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Schema used when derivation is impossible (reflection failure
/// analogue) — panic-free fallback rather than aborting registration.
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_schema_with_required_and_optional_params() {
        let params = [
            ParamSpec::required("a", ParamType::String),
            ParamSpec::optional("b", ParamType::Integer),
        ];
        let schema = generate_input_schema(&params);
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "a": {"type": "string"},
                    "b": {"type": "integer"},
                },
                "required": ["a"],
            })
        );
    }

    #[test]
    fn empty_params_yield_empty_schema() {
        let schema = generate_input_schema(&[]);
        assert_eq!(schema, empty_object_schema());
    }
}
