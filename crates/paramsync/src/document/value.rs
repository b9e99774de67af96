//! In-memory representation of a loaded configuration document.

use std::fmt;

/// A parsed configuration document.
///
/// Mappings keep the key order of the source document so that flattening,
/// and therefore the order in which parameters are written, is stable.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<StructuredValue>),
    Mapping(Vec<(String, StructuredValue)>),
}

/// A numeric scalar as it appeared in the source document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::UInt(n) => write!(f, "{}", n),
            Number::Float(n) if n.is_nan() => f.write_str("NaN"),
            Number::Float(n) if n.is_infinite() => {
                if n.is_sign_negative() {
                    f.write_str("-Infinity")
                } else {
                    f.write_str("Infinity")
                }
            }
            // f64's Display already omits the fraction of integral values.
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

impl StructuredValue {
    /// Parses a YAML string into a document.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        Ok(Self::from(value))
    }

    /// Parses a JSON string into a document.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Ok(Self::from(value))
    }

    /// Returns true for values that are neither a sequence nor a mapping.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            StructuredValue::Sequence(_) | StructuredValue::Mapping(_)
        )
    }

    /// Looks up a direct child of a mapping by key.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        match self {
            StructuredValue::Mapping(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Short name of the value's shape, used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StructuredValue::Null => "null",
            StructuredValue::Bool(_) => "boolean",
            StructuredValue::Number(_) => "number",
            StructuredValue::String(_) => "string",
            StructuredValue::Sequence(_) => "sequence",
            StructuredValue::Mapping(_) => "mapping",
        }
    }

    /// Merges `incoming` into `self`.
    ///
    /// Two mappings are merged key by key; any other combination replaces
    /// the current value.
    pub fn merge(&mut self, incoming: StructuredValue) {
        match (self, incoming) {
            (StructuredValue::Mapping(existing), StructuredValue::Mapping(entries)) => {
                for (key, value) in entries {
                    match existing.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, slot)) => slot.merge(value),
                        None => existing.push((key, value)),
                    }
                }
            }
            (target, value) => *target = value,
        }
    }
}

impl From<serde_yaml::Value> for StructuredValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => StructuredValue::Null,
            Value::Bool(b) => StructuredValue::Bool(b),
            Value::Number(n) => StructuredValue::Number(yaml_number(&n)),
            Value::String(s) => StructuredValue::String(s),
            Value::Sequence(items) => {
                StructuredValue::Sequence(items.into_iter().map(Self::from).collect())
            }
            Value::Mapping(map) => StructuredValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => StructuredValue::Null,
            Value::Bool(b) => StructuredValue::Bool(b),
            Value::Number(n) => StructuredValue::Number(json_number(&n)),
            Value::String(s) => StructuredValue::String(s),
            Value::Array(items) => {
                StructuredValue::Sequence(items.into_iter().map(Self::from).collect())
            }
            Value::Object(map) => StructuredValue::Mapping(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// YAML allows non-string keys; they are addressed by their scalar text.
fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(s) => s,
        Value::Number(n) => yaml_number(&n).to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
