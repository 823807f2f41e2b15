use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validated argument value, ready to be placed in a query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Decimal(d) => Some(*d),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Arguments that passed schema validation.
///
/// Keys are unique and keep insertion order, which is the order they are
/// appended to the provider query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidatedArgs {
    entries: Vec<(String, ParamValue)>,
}

impl ValidatedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill in defaults for names the caller did not supply. Caller values win.
    pub fn merged_with_defaults(mut self, defaults: &[(&str, ParamValue)]) -> Self {
        for (name, value) in defaults {
            if !self.contains(name) {
                self.entries.push((name.to_string(), value.clone()));
            }
        }
        self
    }
}

/// Normalized outcome of one provider interaction.
///
/// `data` is meaningful only when `success` is true, `error` only when it is
/// false. `endpoint` and `timestamp` are always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCallResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub endpoint: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiCallResult {
    pub fn ok(endpoint: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            endpoint: endpoint.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(endpoint: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            endpoint: endpoint.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Integer(15).to_string(), "15");
        assert_eq!(ParamValue::Decimal(2.5).to_string(), "2.5");
        assert_eq!(ParamValue::Decimal(3.0).to_string(), "3");
        assert_eq!(ParamValue::from("Austin").to_string(), "Austin");
    }

    #[test]
    fn test_validated_args_insert_replaces() {
        let mut args = ValidatedArgs::new().with("city", "Austin").with("limit", 5);
        args.insert("limit", 7);

        assert_eq!(args.len(), 2);
        assert_eq!(args.get("limit"), Some(&ParamValue::Integer(7)));
        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["city", "limit"]);
    }

    #[test]
    fn test_defaults_do_not_override_caller_values() {
        let args = ValidatedArgs::new()
            .with("limit", 3)
            .merged_with_defaults(&[
                ("limit", ParamValue::Integer(10)),
                ("dataType", ParamValue::from("All")),
            ]);

        assert_eq!(args.get("limit"), Some(&ParamValue::Integer(3)));
        assert_eq!(args.get_str("dataType"), Some("All"));
    }

    #[test]
    fn test_api_call_result_failed_has_no_data() {
        let result = ApiCallResult::failed("/properties/123", "API Error 404: Not found");
        assert!(!result.success);
        assert!(result.data.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["endpoint"], "/properties/123");
    }
}
