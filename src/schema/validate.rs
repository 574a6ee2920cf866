use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPathElem {
    Field(String),
    Index(usize),
}

/// One schema violation, located by a `$`-rooted path into the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Widget the payload belongs to.
    pub id: String,
    pub path: Vec<SchemaPathElem>,
    pub message: String,
}

impl SchemaError {
    fn at(id: &str, path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            path: path.to_vec(),
            message: message.into(),
        }
    }

    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.id, format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Checks a raw widget payload against a JSON schema.
pub trait SchemaValidator: Send + Sync {
    /// Return every violation found; an empty vector means the payload is valid.
    fn validate(&self, schema: &Value, payload: &[u8], id: &str) -> Vec<SchemaError>;
}

/// Validator for the JSON-Schema keywords widget schemas use.
///
/// Unknown keywords are ignored, so richer schemas degrade to the checks below rather than
/// rejecting payloads.
#[derive(Debug, Default)]
pub struct JsonSchemaValidator {
    patterns: PatternCache,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compiled `pattern` keywords, shared by every payload checked with the same validator.
#[derive(Debug, Default)]
struct PatternCache(Mutex<HashMap<String, Result<Regex, String>>>);

impl PatternCache {
    /// `Ok(true)` when `s` matches, `Err` with the compile error for an invalid pattern.
    fn is_match(&self, pattern: &str, s: &str) -> Result<bool, String> {
        let mut compiled = self.0.lock();
        let re = compiled
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).map_err(|e| e.to_string()));
        re.as_ref().map(|re| re.is_match(s)).map_err(Clone::clone)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, payload: &[u8], id: &str) -> Vec<SchemaError> {
        let doc: Value = match serde_json::from_slice(payload) {
            Ok(v) => v,
            Err(e) => {
                return vec![SchemaError::at(id, &[], format!("payload is not JSON: {e}"))];
            }
        };
        let mut errors = Vec::new();
        check(schema, &doc, &mut Vec::new(), id, &self.patterns, &mut errors);
        errors
    }
}

fn check(
    schema: &Value,
    value: &Value,
    path: &mut Vec<SchemaPathElem>,
    id: &str,
    patterns: &PatternCache,
    errors: &mut Vec<SchemaError>,
) {
    let Some(rules) = schema.as_object() else {
        // `true`/`{}` accept everything, `false` accepts nothing.
        if schema == &Value::Bool(false) {
            errors.push(SchemaError::at(id, path, "no value is allowed here"));
        }
        return;
    };

    if let Some(expected) = rules.get("type")
        && !type_matches(expected, value)
    {
        errors.push(SchemaError::at(
            id,
            path,
            format!("expected type {expected}, got {}", type_name(value)),
        ));
        // Remaining keywords assume the right type.
        return;
    }

    if let Some(allowed) = rules.get("enum").and_then(Value::as_array)
        && !allowed.contains(value)
    {
        errors.push(SchemaError::at(
            id,
            path,
            format!("{value} is not one of {}", Value::Array(allowed.clone())),
        ));
    }
    if let Some(constant) = rules.get("const")
        && constant != value
    {
        errors.push(SchemaError::at(id, path, format!("must equal {constant}")));
    }

    match value {
        Value::Number(n) => check_number(rules, n.as_f64().unwrap_or(f64::NAN), path, id, errors),
        Value::String(s) => check_string(rules, s, path, id, patterns, errors),
        Value::Array(items) => check_array(rules, items, path, id, patterns, errors),
        Value::Object(fields) => check_object(rules, fields, path, id, patterns, errors),
        Value::Null | Value::Bool(_) => {}
    }
}

fn check_number(
    rules: &serde_json::Map<String, Value>,
    n: f64,
    path: &[SchemaPathElem],
    id: &str,
    errors: &mut Vec<SchemaError>,
) {
    if let Some(min) = rules.get("minimum").and_then(Value::as_f64)
        && n < min
    {
        errors.push(SchemaError::at(id, path, format!("{n} is less than the minimum of {min}")));
    }
    if let Some(max) = rules.get("maximum").and_then(Value::as_f64)
        && n > max
    {
        errors.push(SchemaError::at(id, path, format!("{n} is greater than the maximum of {max}")));
    }
}

fn check_string(
    rules: &serde_json::Map<String, Value>,
    s: &str,
    path: &[SchemaPathElem],
    id: &str,
    patterns: &PatternCache,
    errors: &mut Vec<SchemaError>,
) {
    let len = s.chars().count() as u64;
    if let Some(min) = rules.get("minLength").and_then(Value::as_u64)
        && len < min
    {
        errors.push(SchemaError::at(id, path, format!("length must be at least {min}")));
    }
    if let Some(max) = rules.get("maxLength").and_then(Value::as_u64)
        && len > max
    {
        errors.push(SchemaError::at(id, path, format!("length must be at most {max}")));
    }
    if let Some(pattern) = rules.get("pattern").and_then(Value::as_str) {
        match patterns.is_match(pattern, s) {
            Ok(false) => errors.push(SchemaError::at(
                id,
                path,
                format!("{s:?} does not match pattern {pattern:?}"),
            )),
            Ok(true) => {}
            Err(e) => errors.push(SchemaError::at(
                id,
                path,
                format!("schema pattern {pattern:?} is invalid: {e}"),
            )),
        }
    }
}

fn check_array(
    rules: &serde_json::Map<String, Value>,
    items: &[Value],
    path: &mut Vec<SchemaPathElem>,
    id: &str,
    patterns: &PatternCache,
    errors: &mut Vec<SchemaError>,
) {
    let len = items.len() as u64;
    if let Some(min) = rules.get("minItems").and_then(Value::as_u64)
        && len < min
    {
        errors.push(SchemaError::at(id, path, format!("must have at least {min} items")));
    }
    if let Some(max) = rules.get("maxItems").and_then(Value::as_u64)
        && len > max
    {
        errors.push(SchemaError::at(id, path, format!("must have at most {max} items")));
    }
    if let Some(item_schema) = rules.get("items") {
        for (i, item) in items.iter().enumerate() {
            path.push(SchemaPathElem::Index(i));
            check(item_schema, item, path, id, patterns, errors);
            path.pop();
        }
    }
}

fn check_object(
    rules: &serde_json::Map<String, Value>,
    fields: &serde_json::Map<String, Value>,
    path: &mut Vec<SchemaPathElem>,
    id: &str,
    patterns: &PatternCache,
    errors: &mut Vec<SchemaError>,
) {
    if let Some(required) = rules.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(name) {
                errors.push(SchemaError::at(id, path, format!("{name} is required")));
            }
        }
    }

    let properties = rules.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (name, sub_schema) in properties {
            if let Some(v) = fields.get(name) {
                path.push(SchemaPathElem::Field(name.clone()));
                check(sub_schema, v, path, id, patterns, errors);
                path.pop();
            }
        }
    }

    if rules.get("additionalProperties") == Some(&Value::Bool(false)) {
        for name in fields.keys() {
            if !properties.is_some_and(|p| p.contains_key(name)) {
                errors.push(SchemaError::at(
                    id,
                    path,
                    format!("additional property {name} is not allowed"),
                ));
            }
        }
    }
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.as_f64().is_some_and(|n| n.fract() == 0.0),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
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
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
