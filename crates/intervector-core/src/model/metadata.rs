use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar metadata value.
///
/// Collections and records carry flat key/value metadata; nested values
/// are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Name SQLite's `json_type()` reports for this value once stored.
    #[must_use]
    pub const fn json_type(&self) -> &'static str {
        match self {
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Int(_) => "integer",
            Self::Float(_) => "real",
            Self::Str(_) => "text",
        }
    }

    /// `false` for NaN and infinite floats, which JSON cannot hold.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// Bound the same way SQLite's json_extract() surfaces JSON scalars. Booleans
// come out as 0/1, so filters also compare json_type().
impl ToSql for MetadataValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Bool(v) => Ok(ToSqlOutput::from(i64::from(*v))),
            Self::Int(v) => Ok(ToSqlOutput::from(*v)),
            Self::Float(v) => Ok(ToSqlOutput::from(*v)),
            Self::Str(v) => Ok(ToSqlOutput::from(v.as_str())),
        }
    }
}

/// Flat metadata mapping, ordered by key.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Build a [`Metadata`] map from `key => value` pairs.
///
/// ```
/// use intervector_core::metadata;
///
/// let meta = metadata! {
///     "purpose" => "agent_coordination",
///     "max_agents" => 50,
/// };
/// assert_eq!(meta.len(), 2);
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::model::Metadata::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::model::Metadata::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::model::MetadataValue::from($value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_json_shape() {
        let meta = crate::metadata! {
            "description" => "Agent registration",
            "max_agents" => 50,
            "auto_cleanup" => true,
            "weight" => 0.5,
        };

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            json!({
                "auto_cleanup": true,
                "description": "Agent registration",
                "max_agents": 50,
                "weight": 0.5
            })
        );
    }

    #[test]
    fn test_integers_stay_integers() {
        let meta: Metadata = serde_json::from_str(r#"{"retention_days": 30}"#).unwrap();
        assert_eq!(meta["retention_days"], MetadataValue::Int(30));
        assert_eq!(meta["retention_days"].as_i64(), Some(30));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(MetadataValue::from("x").as_str(), Some("x"));
        assert_eq!(MetadataValue::from(true).as_bool(), Some(true));
        assert!(MetadataValue::from(1).as_str().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(MetadataValue::from("active").to_string(), "active");
        assert_eq!(MetadataValue::from(100).to_string(), "100");
        assert_eq!(MetadataValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(MetadataValue::from(true).json_type(), "true");
        assert_eq!(MetadataValue::from(false).json_type(), "false");
        assert_eq!(MetadataValue::from(7).json_type(), "integer");
        assert_eq!(MetadataValue::from(0.5).json_type(), "real");
        assert_eq!(MetadataValue::from("x").json_type(), "text");
    }

    #[test]
    fn test_is_finite() {
        assert!(MetadataValue::from(0.5).is_finite());
        assert!(MetadataValue::from("NaN").is_finite());
        assert!(!MetadataValue::from(f64::NAN).is_finite());
        assert!(!MetadataValue::from(f64::INFINITY).is_finite());
    }

    #[test]
    fn test_empty_macro() {
        let meta = crate::metadata!();
        assert!(meta.is_empty());
    }
}
