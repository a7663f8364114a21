//! Parameter schema descriptors
//!
//! A tool's arguments are described by a `ParameterSchema`: an ordered list of
//! named fields, each carrying a `ParamKind`. The same descriptor drives both
//! the JSON Schema shown to the model and the structural validator.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Kind of a single parameter, with its declared constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamKind {
    /// UTF-8 string, optionally bounded in length (characters)
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Number, optionally integral and range-bounded
    Number {
        #[serde(default)]
        integer: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        /// Accept numeric strings such as `"3"` and convert them
        #[serde(default)]
        coerce_from_string: bool,
    },
    /// Boolean
    Boolean,
    /// One of a closed set of strings
    Enum { values: Vec<String> },
    /// Nested object with its own fields
    Object { schema: ParameterSchema },
}

impl ParamKind {
    /// Unbounded string
    pub fn string() -> Self {
        ParamKind::String {
            min_length: None,
            max_length: None,
        }
    }

    /// Unbounded floating point number
    pub fn number() -> Self {
        ParamKind::Number {
            integer: false,
            minimum: None,
            maximum: None,
            coerce_from_string: false,
        }
    }

    /// Unbounded integer
    pub fn integer() -> Self {
        ParamKind::Number {
            integer: true,
            minimum: None,
            maximum: None,
            coerce_from_string: false,
        }
    }

    /// Closed set of string values
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Render this kind as a JSON Schema fragment
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParamKind::String {
                min_length,
                max_length,
            } => {
                let mut obj = json!({ "type": "string" });
                if let Some(min) = min_length {
                    obj["minLength"] = json!(min);
                }
                if let Some(max) = max_length {
                    obj["maxLength"] = json!(max);
                }
                obj
            }
            ParamKind::Number {
                integer,
                minimum,
                maximum,
                ..
            } => {
                let ty = if *integer { "integer" } else { "number" };
                let mut obj = json!({ "type": ty });
                if let Some(min) = minimum {
                    obj["minimum"] = json!(min);
                }
                if let Some(max) = maximum {
                    obj["maximum"] = json!(max);
                }
                obj
            }
            ParamKind::Boolean => json!({ "type": "boolean" }),
            ParamKind::Enum { values } => json!({ "type": "string", "enum": values }),
            ParamKind::Object { schema } => schema.to_json_schema(),
        }
    }
}

/// A named parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    /// Create an optional parameter
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
        }
    }

    /// Mark the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bound a string or number parameter. No-op for other kinds.
    pub fn with_range(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        match &mut self.kind {
            ParamKind::Number {
                minimum, maximum, ..
            } => {
                *minimum = lower;
                *maximum = upper;
            }
            ParamKind::String {
                min_length,
                max_length,
            } => {
                *min_length = lower.map(|v| v as usize);
                *max_length = upper.map(|v| v as usize);
            }
            _ => {}
        }
        self
    }

    /// Allow numeric strings for a number parameter. No-op for other kinds.
    pub fn coerce_from_string(mut self) -> Self {
        if let ParamKind::Number {
            coerce_from_string, ..
        } = &mut self.kind
        {
            *coerce_from_string = true;
        }
        self
    }
}

/// Ordered set of parameters accepted by a tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(default)]
    fields: Vec<ParamSpec>,
}

impl ParameterSchema {
    /// Schema that accepts no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, spec: ParamSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Whether the schema declares no parameters
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared parameters in declaration order
    pub fn fields(&self) -> &[ParamSpec] {
        &self.fields
    }

    /// Look up a parameter by name
    pub fn field(&self, name: &str) -> Option<&ParamSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object for the model-facing catalog
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = field.kind.to_json_schema();
            if !field.description.is_empty() {
                prop["description"] = json!(field.description);
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(properties),
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schema_renders_closed_object() {
        let schema = ParameterSchema::empty();
        assert!(schema.is_empty());
        assert_eq!(
            schema.to_json_schema(),
            json!({ "type": "object", "properties": {}, "additionalProperties": false })
        );
    }

    #[test]
    fn test_schema_rendering() {
        let schema = ParameterSchema::empty()
            .with(ParamSpec::new("category", "Project category", ParamKind::one_of(["Robotics", "AI / Voice"])))
            .with(
                ParamSpec::new("limit", "Max items", ParamKind::integer())
                    .with_range(Some(1.0), Some(20.0))
                    .required(),
            );

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["properties"]["category"]["enum"], json!(["Robotics", "AI / Voice"]));
        assert_eq!(rendered["properties"]["limit"]["type"], "integer");
        assert_eq!(rendered["properties"]["limit"]["minimum"], json!(1.0));
        assert_eq!(rendered["required"], json!(["limit"]));
        assert_eq!(rendered["properties"]["category"]["description"], "Project category");
    }

    #[test]
    fn test_nested_object_schema() {
        let inner = ParameterSchema::empty()
            .with(ParamSpec::new("verbose", "", ParamKind::Boolean));
        let schema = ParameterSchema::empty()
            .with(ParamSpec::new("options", "", ParamKind::Object { schema: inner }));

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["properties"]["options"]["type"], "object");
        assert_eq!(
            rendered["properties"]["options"]["properties"]["verbose"]["type"],
            "boolean"
        );
    }

    #[test]
    fn test_builders_ignore_unrelated_kinds() {
        let spec = ParamSpec::new("flag", "", ParamKind::Boolean)
            .coerce_from_string()
            .with_range(Some(1.0), None);
        assert_eq!(spec.kind, ParamKind::Boolean);

        let spec = ParamSpec::new("name", "", ParamKind::string()).with_range(Some(1.0), Some(5.0));
        assert_eq!(
            spec.kind,
            ParamKind::String {
                min_length: Some(1),
                max_length: Some(5)
            }
        );
    }

    #[test]
    fn test_schema_serde() {
        let schema = ParameterSchema::empty()
            .with(ParamSpec::new("limit", "", ParamKind::integer()).coerce_from_string());
        let yaml = serde_json::to_string(&schema).unwrap();
        let back: ParameterSchema = serde_json::from_str(&yaml).unwrap();
        assert_eq!(back, schema);
        assert!(yaml.contains("\"kind\":\"number\""));
    }
}
