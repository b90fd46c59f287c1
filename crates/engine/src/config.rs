//! Component configuration parsing.
//!
//! A config is either a bare component name or a single-entry object mapping
//! a name to its props. Both reduce to a `(canonical name, props)` pair.

use latebind_registry::canonicalize;
use latebind_types::{ConfigError, Props};
use serde_json::Value;

/// Identifies a component and, in inline form, its props.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentConfig {
    /// `"hello"`: props come from the caller's defaults.
    Named(String),
    /// `{"hello": {"greeting": "Hi"}}`: self-contained; only the first
    /// entry is used.
    Inline(Props),
}

impl From<&str> for ComponentConfig {
    fn from(name: &str) -> Self {
        ComponentConfig::Named(name.to_string())
    }
}

impl From<String> for ComponentConfig {
    fn from(name: String) -> Self {
        ComponentConfig::Named(name)
    }
}

impl From<Props> for ComponentConfig {
    fn from(entries: Props) -> Self {
        ComponentConfig::Inline(entries)
    }
}

impl TryFrom<&Value> for ComponentConfig {
    type Error = ConfigError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(ComponentConfig::Named(name.clone())),
            Value::Object(entries) => Ok(ComponentConfig::Inline(entries.clone())),
            other => Err(ConfigError::UnsupportedType {
                found: value_kind(other),
            }),
        }
    }
}

impl ComponentConfig {
    /// Reduces the config to `(canonical name, props)`.
    ///
    /// `default_props` only applies to the named form.
    pub fn into_parts(self, default_props: Props) -> Result<(String, Props), ConfigError> {
        match self {
            ComponentConfig::Named(name) => Ok((canonicalize(&name)?, default_props)),
            ComponentConfig::Inline(entries) => {
                let (name, props) = entries.into_iter().next().ok_or(ConfigError::Empty)?;
                let props = match props {
                    Value::Object(props) => props,
                    Value::Null => Props::new(),
                    other => {
                        return Err(ConfigError::InvalidProps {
                            name,
                            found: value_kind(&other),
                        });
                    }
                };
                Ok((canonicalize(&name)?, props))
            }
        }
    }
}

/// Parses a JSON config value into `(canonical name, props)`.
///
/// # Errors
/// - [`ConfigError::UnsupportedType`] for values that are neither strings nor objects
/// - [`ConfigError::Empty`] for `{}`
/// - [`ConfigError::InvalidProps`] when the inline props are not an object
/// - [`ConfigError::InvalidName`] when the name has no word characters
pub fn parse_config(config: &Value, default_props: Props) -> Result<(String, Props), ConfigError> {
    ComponentConfig::try_from(config)?.into_parts(default_props)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
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
    use latebind_types::InvalidName;
    use serde_json::json;

    fn props(value: Value) -> Props {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn string_config_uses_default_props() {
        let defaults = props(json!({"greeting": "Hi"}));
        let parsed = parse_config(&json!("hello"), defaults.clone()).unwrap();
        assert_eq!(parsed, ("Hello".to_string(), defaults));
    }

    #[test]
    fn object_config_ignores_default_props() {
        let config = json!({"trend-chart": {"interval": "month"}});
        let parsed = parse_config(&config, props(json!({"ignored": true}))).unwrap();
        assert_eq!(parsed, ("TrendChart".to_string(), props(json!({"interval": "month"}))));
    }

    #[test]
    fn object_config_takes_first_entry_in_order() {
        let config = json!({"second": {"n": 2}, "first": {"n": 1}});
        let (name, parsed_props) = parse_config(&config, Props::new()).unwrap();
        assert_eq!(name, "Second");
        assert_eq!(parsed_props["n"], json!(2));
    }

    #[test]
    fn null_inline_props_become_empty() {
        let (name, parsed_props) = parse_config(&json!({"hello": null}), Props::new()).unwrap();
        assert_eq!(name, "Hello");
        assert!(parsed_props.is_empty());
    }

    #[test]
    fn malformed_configs_are_rejected() {
        assert_eq!(parse_config(&json!({}), Props::new()), Err(ConfigError::Empty));
        assert_eq!(
            parse_config(&json!(42), Props::new()),
            Err(ConfigError::UnsupportedType { found: "number" })
        );
        assert_eq!(
            parse_config(&json!(["hello"]), Props::new()),
            Err(ConfigError::UnsupportedType { found: "array" })
        );
        assert_eq!(
            parse_config(&json!({"hello": "Hi"}), Props::new()),
            Err(ConfigError::InvalidProps {
                name: "hello".into(),
                found: "string"
            })
        );
        assert_eq!(
            parse_config(&json!(""), Props::new()),
            Err(ConfigError::InvalidName(InvalidName { name: String::new() }))
        );
    }

    #[test]
    fn rust_callers_share_the_same_parser() {
        let named = ComponentConfig::from("hello").into_parts(Props::new()).unwrap();
        let inline = ComponentConfig::from(props(json!({"hello": {}}))).into_parts(Props::new()).unwrap();
        assert_eq!(named, inline);
    }
}
