//! Input schemas and argument validation.
//!
//! Every tool declares an ordered set of named, typed parameters. The
//! validator runs before each invocation so handlers can assume well-typed
//! input, and serializes the declaration into the JSON form advertised
//! during the session handshake.
//!
//! Coercion policy (deliberate, not accidental permissiveness):
//! - `Integer` accepts an integral JSON number or a numeric string (`"3"`).
//!   Fractional numbers are rejected, never truncated.
//! - `Float` accepts any JSON number or a numeric string (`"2.5"`).
//! - `String` accepts JSON strings only.
//! - `Enum` accepts only its declared string variants.
//!
//! Validation returns a canonicalized argument map with coercions applied.

use serde_json::{Map, Value, json};

use super::error::ToolError;

/// The semantic type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A JSON string.
    String,
    /// A 64-bit signed integer.
    Integer,
    /// A 64-bit float.
    Float,
    /// One of a fixed set of string variants.
    Enum(&'static [&'static str]),
}

impl ParamType {
    /// Human-readable name used in validation errors and schema JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Enum(_) => "string",
        }
    }
}

/// One declared parameter of a tool's input schema.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name, unique within a schema.
    pub name: &'static str,

    /// The parameter's semantic type.
    pub ty: ParamType,

    /// Whether the parameter must be present in every call.
    pub required: bool,

    /// Documentation shown to clients in the handshake.
    pub description: &'static str,
}

/// The ordered set of parameters a tool accepts.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    params: Vec<ParamSpec>,
}

/// Builder for [`InputSchema`], used by tool definitions at registration.
#[derive(Debug, Default)]
pub struct InputSchemaBuilder {
    params: Vec<ParamSpec>,
}

impl InputSchemaBuilder {
    /// Declare a required parameter.
    pub fn required(
        mut self,
        name: &'static str,
        ty: ParamType,
        description: &'static str,
    ) -> Self {
        self.params.push(ParamSpec {
            name,
            ty,
            required: true,
            description,
        });
        self
    }

    /// Declare an optional parameter.
    pub fn optional(
        mut self,
        name: &'static str,
        ty: ParamType,
        description: &'static str,
    ) -> Self {
        self.params.push(ParamSpec {
            name,
            ty,
            required: false,
            description,
        });
        self
    }

    /// Finish building the schema.
    pub fn build(self) -> InputSchema {
        InputSchema {
            params: self.params,
        }
    }
}

impl InputSchema {
    /// Start declaring a schema.
    pub fn builder() -> InputSchemaBuilder {
        InputSchemaBuilder::default()
    }

    /// The declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validate call arguments against this schema.
    ///
    /// Checks that every required parameter is present, that no unexpected
    /// parameter names appear, and that each value matches its declared type
    /// under the module's coercion policy. Returns the canonicalized
    /// argument map on success.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        for key in arguments.keys() {
            if !self.params.iter().any(|p| p.name == key.as_str()) {
                return Err(ToolError::invalid_arguments(format!(
                    "unexpected parameter '{key}'"
                )));
            }
        }

        let mut canonical = Map::new();
        for spec in &self.params {
            match arguments.get(spec.name) {
                Some(value) => {
                    let coerced = coerce(spec, value)?;
                    canonical.insert(spec.name.to_string(), coerced);
                }
                None if spec.required => {
                    return Err(ToolError::invalid_arguments(format!(
                        "missing required parameter '{}'",
                        spec.name
                    )));
                }
                None => {}
            }
        }
        Ok(canonical)
    }

    /// Serialize this schema into the JSON object form advertised to clients.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in &self.params {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(spec.ty.name()));
            prop.insert("description".to_string(), json!(spec.description));
            if let ParamType::Enum(variants) = spec.ty {
                prop.insert("enum".to_string(), json!(variants));
            }
            properties.insert(spec.name.to_string(), Value::Object(prop));
            if spec.required {
                required.push(spec.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Coerce one value to its declared parameter type.
fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value, ToolError> {
    match &spec.ty {
        ParamType::String => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(type_mismatch(spec, "string", other)),
        },
        ParamType::Integer => match value {
            Value::Number(n) if n.as_i64().is_some() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|n| json!(n))
                .map_err(|_| type_mismatch(spec, "integer", value)),
            other => Err(type_mismatch(spec, "integer", other)),
        },
        ParamType::Float => match value {
            Value::Number(n) if n.as_f64().is_some() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| type_mismatch(spec, "number", value)),
            other => Err(type_mismatch(spec, "number", other)),
        },
        ParamType::Enum(variants) => match value {
            Value::String(s) if variants.contains(&s.as_str()) => Ok(value.clone()),
            other => Err(ToolError::invalid_arguments(format!(
                "parameter '{}': expected one of {:?}, got {}",
                spec.name,
                variants,
                shape_of(other)
            ))),
        },
    }
}

fn type_mismatch(spec: &ParamSpec, expected: &str, actual: &Value) -> ToolError {
    ToolError::invalid_arguments(format!(
        "parameter '{}': expected {expected}, got {}",
        spec.name,
        shape_of(actual)
    ))
}

/// Describe a JSON value's runtime shape for error messages.
fn shape_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) if n.as_i64().is_some() => "integer".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
