//! Structural validation of tool arguments
//!
//! A single generic validator walks a `ParameterSchema` against the raw
//! arguments proposed by the model. Validation is strict: unknown fields,
//! wrong types and out-of-range values are rejected instead of being dropped
//! or repaired. The only conversion performed is numeric string → number, and
//! only for fields that declare `coerce_from_string`.

use serde_json::{Map, Number, Value};

use super::error::ToolError;
use super::registry::ToolDefinition;
use super::schema::{ParamKind, ParameterSchema};

/// Validated arguments for a tool call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Arguments for a tool that takes none
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an argument by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get an argument as a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Get an argument as an i64
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|v| v.as_i64())
    }

    /// Get an argument as an f64
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(|v| v.as_f64())
    }

    /// Get an argument as a bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    /// The arguments as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Validate raw model arguments against a tool definition
pub fn validate(def: &ToolDefinition, raw: &Value) -> Result<ToolArguments, ToolError> {
    validate_schema(&def.name, &def.schema, raw)
}

/// Validate raw arguments against a schema on behalf of `tool`
pub fn validate_schema(
    tool: &str,
    schema: &ParameterSchema,
    raw: &Value,
) -> Result<ToolArguments, ToolError> {
    let object = normalize_raw(raw).map_err(|reason| ToolError::schema_mismatch(tool, reason))?;

    if schema.is_empty() {
        if let Some(key) = object.keys().next() {
            return Err(ToolError::schema_mismatch(
                tool,
                format!("tool takes no arguments, got '{}'", key),
            ));
        }
        return Ok(ToolArguments::empty());
    }

    check_object(schema, &object, "")
        .map(ToolArguments)
        .map_err(|reason| ToolError::schema_mismatch(tool, reason))
}

/// Reduce the transport encodings a model may use to a JSON object.
///
/// Absent arguments arrive as `null` or an empty string; some providers pass
/// the arguments as a JSON-encoded string.
fn normalize_raw(raw: &Value) -> Result<Map<String, Value>, String> {
    match raw {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        Value::String(s) if s.trim().is_empty() => Ok(Map::new()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("arguments must be an object, got {}", type_name(&other))),
            Err(e) => Err(format!("arguments are not valid JSON: {}", e)),
        },
        other => Err(format!("arguments must be an object, got {}", type_name(other))),
    }
}

fn check_object(
    schema: &ParameterSchema,
    object: &Map<String, Value>,
    prefix: &str,
) -> Result<Map<String, Value>, String> {
    if let Some(unknown) = object.keys().find(|k| schema.field(k).is_none()) {
        return Err(format!("unknown field '{}{}'", prefix, unknown));
    }

    let mut out = Map::new();
    for field in schema.fields() {
        let path = format!("{}{}", prefix, field.name);
        match object.get(&field.name) {
            Some(value) => {
                let checked = check_value(&field.kind, value, &path)?;
                out.insert(field.name.clone(), checked);
            }
            None if field.required => return Err(format!("missing required field '{}'", path)),
            None => {}
        }
    }
    Ok(out)
}

fn check_value(kind: &ParamKind, value: &Value, path: &str) -> Result<Value, String> {
    match kind {
        ParamKind::String {
            min_length,
            max_length,
        } => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(path, "string", value))?;
            let len = s.chars().count();
            if min_length.is_some_and(|min| len < min) || max_length.is_some_and(|max| len > max) {
                return Err(format!("field '{}' has length {} outside the allowed range", path, len));
            }
            Ok(value.clone())
        }
        ParamKind::Number {
            integer,
            minimum,
            maximum,
            coerce_from_string,
        } => {
            let number = match value {
                Value::Number(n) => n.clone(),
                Value::String(s) if *coerce_from_string => parse_number(s, *integer)
                    .ok_or_else(|| format!("field '{}' is not a numeric string: {:?}", path, s))?,
                _ => return Err(mismatch(path, if *integer { "integer" } else { "number" }, value)),
            };
            if *integer && !(number.is_i64() || number.is_u64()) {
                return Err(format!("field '{}' must be an integer, got {}", path, number));
            }
            let as_f64 = number
                .as_f64()
                .ok_or_else(|| format!("field '{}' is not representable as a number", path))?;
            if minimum.is_some_and(|min| as_f64 < min) || maximum.is_some_and(|max| as_f64 > max) {
                return Err(format!("field '{}' = {} is out of range", path, number));
            }
            Ok(Value::Number(number))
        }
        ParamKind::Boolean => {
            if value.is_boolean() {
                Ok(value.clone())
            } else {
                Err(mismatch(path, "boolean", value))
            }
        }
        ParamKind::Enum { values } => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(path, "string", value))?;
            if values.iter().any(|v| v == s) {
                Ok(value.clone())
            } else {
                Err(format!(
                    "field '{}' must be one of [{}], got '{}'",
                    path,
                    values.join(", "),
                    s
                ))
            }
        }
        ParamKind::Object { schema } => {
            let object = value
                .as_object()
                .ok_or_else(|| mismatch(path, "object", value))?;
            check_object(schema, object, &format!("{}.", path)).map(Value::Object)
        }
    }
}

/// Parse a numeric string. Integers must parse exactly; floats must be finite.
fn parse_number(s: &str, integer: bool) -> Option<Number> {
    let s = s.trim();
    if integer {
        s.parse::<i64>().ok().map(Number::from)
    } else if let Ok(i) = s.parse::<i64>() {
        Some(Number::from(i))
    } else {
        s.parse::<f64>().ok().and_then(Number::from_f64)
    }
}

fn mismatch(path: &str, expected: &str, got: &Value) -> String {
    format!("field '{}' must be a {}, got {}", path, expected, type_name(got))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::ParamSpec;
    use serde_json::json;

    fn projects_schema() -> ParameterSchema {
        ParameterSchema::empty()
            .with(ParamSpec::new(
                "category",
                "",
                ParamKind::one_of(["Robotics", "Productivity"]),
            ))
            .with(
                ParamSpec::new("limit", "", ParamKind::integer())
                    .with_range(Some(1.0), Some(10.0))
                    .coerce_from_string(),
            )
    }

    fn assert_mismatch(result: Result<ToolArguments, ToolError>, needle: &str) {
        match result {
            Err(ToolError::SchemaMismatch { reason, .. }) => {
                assert!(reason.contains(needle), "reason '{}' should mention '{}'", reason, needle)
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_schema_accepts_absent_arguments() {
        let schema = ParameterSchema::empty();
        for raw in [Value::Null, json!({}), json!(""), json!("{}")] {
            let args = validate_schema("getSkills", &schema, &raw).unwrap();
            assert!(args.is_empty());
        }
    }

    #[test]
    fn test_empty_schema_rejects_any_content() {
        let schema = ParameterSchema::empty();
        assert_mismatch(validate_schema("getSkills", &schema, &json!({"x": 1})), "no arguments");
        assert_mismatch(validate_schema("getSkills", &schema, &json!([1])), "object");
        assert_mismatch(validate_schema("getSkills", &schema, &json!(42)), "object");
        assert_mismatch(validate_schema("getSkills", &schema, &json!("not json")), "valid JSON");
        assert_mismatch(validate_schema("getSkills", &schema, &json!(r#"{"x":1}"#)), "no arguments");
    }

    #[test]
    fn test_well_formed_arguments_round_trip() {
        let raw = json!({"category": "Robotics", "limit": 3});
        let args = validate_schema("getProjects", &projects_schema(), &raw).unwrap();
        assert_eq!(args.to_value(), raw);
        assert_eq!(args.get_str("category"), Some("Robotics"));
        assert_eq!(args.get_i64("limit"), Some(3));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let raw = json!({"category": "Robotics", "sort": "date"});
        assert_mismatch(validate_schema("getProjects", &projects_schema(), &raw), "unknown field 'sort'");
    }

    #[test]
    fn test_enum_and_range_constraints() {
        let schema = projects_schema();
        assert_mismatch(validate_schema("t", &schema, &json!({"category": "Cooking"})), "one of");
        assert_mismatch(validate_schema("t", &schema, &json!({"limit": 0})), "out of range");
        assert_mismatch(validate_schema("t", &schema, &json!({"limit": 11})), "out of range");
        assert_mismatch(validate_schema("t", &schema, &json!({"limit": 2.5})), "integer");
        assert_mismatch(validate_schema("t", &schema, &json!({"limit": null})), "got null");
    }

    #[test]
    fn test_declared_coercion_only() {
        let args = validate_schema("t", &projects_schema(), &json!({"limit": " 4 "})).unwrap();
        assert_eq!(args.get("limit"), Some(&json!(4)));

        assert_mismatch(validate_schema("t", &projects_schema(), &json!({"limit": "four"})), "numeric string");
        assert_mismatch(validate_schema("t", &projects_schema(), &json!({"limit": "2.5"})), "numeric string");

        let strict = ParameterSchema::empty().with(ParamSpec::new("n", "", ParamKind::number()));
        assert_mismatch(validate_schema("t", &strict, &json!({"n": "1.5"})), "must be a number");
        let args = validate_schema("t", &strict, &json!({"n": 1.5})).unwrap();
        assert_eq!(args.get_f64("n"), Some(1.5));
    }

    #[test]
    fn test_required_and_nested_fields() {
        let schema = ParameterSchema::empty()
            .with(ParamSpec::new("query", "", ParamKind::string()).with_range(Some(1.0), Some(8.0)).required())
            .with(ParamSpec::new(
                "options",
                "",
                ParamKind::Object {
                    schema: ParameterSchema::empty().with(ParamSpec::new("exact", "", ParamKind::Boolean)),
                },
            ));

        assert_mismatch(validate_schema("t", &schema, &json!({})), "missing required field 'query'");
        assert_mismatch(validate_schema("t", &schema, &json!({"query": ""})), "length 0");
        assert_mismatch(
            validate_schema("t", &schema, &json!({"query": "ai", "options": {"exact": "yes"}})),
            "options.exact",
        );
        assert_mismatch(
            validate_schema("t", &schema, &json!({"query": "ai", "options": {"fuzzy": true}})),
            "unknown field 'options.fuzzy'",
        );

        let raw = json!({"query": "ai", "options": {"exact": true}});
        let args = validate_schema("t", &schema, &raw).unwrap();
        assert_eq!(args.to_value(), raw);
    }

    #[test]
    fn test_error_names_the_tool() {
        let err = validate_schema("getContact", &ParameterSchema::empty(), &json!({"a": 1})).unwrap_err();
        assert_eq!(
            err,
            ToolError::schema_mismatch("getContact", "tool takes no arguments, got 'a'")
        );
    }
}
