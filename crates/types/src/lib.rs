//! Shared data model for late-bound component resolution.
//!
//! Everything that crosses crate boundaries lives here: the properties bag,
//! rendered markup, remote parameter metadata, the tri-state remote
//! [`Resolution`], and the error taxonomy in [`errors`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

pub mod errors;

pub use errors::{BindingError, ConfigError, FetchError, InvalidName, RenderError, TemplateError};

/// Ordered property bag handed to a renderable.
///
/// Insertion order is preserved (`serde_json/preserve_order`), which is what
/// "first entry wins" for object-form configs relies on.
pub type Props = JsonMap<String, Value>;

/// Parameter metadata for a remote proxy, keyed by template parameter name.
pub type ParamMetaMap = IndexMap<String, ParamMeta>;

/// Shallow merge of two property bags. Keys in `overrides` win.
pub fn merge_props(base: &Props, overrides: &Props) -> Props {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Rendered output of a renderable.
///
/// An empty `Markup` is the "render nothing" result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Markup {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Markup {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Declares a single remote template parameter.
///
/// Deserializes from either JSON or YAML metadata files:
///
/// ```yaml
/// interval:
///   default: month
///   description: Bucket size for the trend
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamMeta {
    /// Value used when the caller does not supply the parameter.
    #[serde(default)]
    pub default: Option<Value>,
    /// Human-readable description shown by tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamMeta {
    pub fn with_default(default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            description: None,
        }
    }
}

/// Outcome of a remote resolution attempt.
///
/// Loading and failure are distinct variants; the fallback renderer receives
/// the whole value and decides how to present each.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resolution {
    /// No payload has arrived for the current target yet.
    #[default]
    Pending,
    /// The fetch completed with a JSON payload.
    Success(Value),
    /// The fetch failed.
    Failure(FetchError),
}

impl Resolution {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Resolution::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Resolution::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Props {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn merge_props_prefers_overrides_and_keeps_base_order() {
        let base = props(json!({"greeting": "Hi", "first": "Brad", "last": "Leupen"}));
        let overrides = props(json!({"first": "Jane", "className": "my-class"}));

        let merged = merge_props(&base, &overrides);

        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["greeting", "first", "last", "className"]);
        assert_eq!(merged["first"], json!("Jane"));
        assert_eq!(merged["className"], json!("my-class"));
    }

    #[test]
    fn param_meta_parses_from_yaml_with_missing_default() {
        let yaml = r#"
dataset:
  description: Dataset identifier
interval:
  default: month
"#;
        let metas: ParamMetaMap = serde_yaml::from_str(yaml).expect("parse meta");
        assert_eq!(metas.len(), 2);
        assert_eq!(metas["dataset"].default, None);
        assert_eq!(metas["dataset"].description.as_deref(), Some("Dataset identifier"));
        assert_eq!(metas["interval"].default, Some(json!("month")));
    }

    #[test]
    fn resolution_accessors_distinguish_states() {
        let pending = Resolution::Pending;
        assert!(pending.is_pending());
        assert!(pending.error().is_none());

        let failed = Resolution::Failure(FetchError::Transport {
            url: "/api".into(),
            message: "connection refused".into(),
        });
        assert!(!failed.is_pending());
        assert!(failed.error().is_some());
        assert!(failed.payload().is_none());

        let done = Resolution::Success(json!({"hello": {}}));
        assert_eq!(done.payload(), Some(&json!({"hello": {}})));
    }

    #[test]
    fn empty_markup_is_the_default() {
        assert!(Markup::default().is_empty());
        assert_eq!(Markup::from("<span/>").to_string(), "<span/>");
    }
}
