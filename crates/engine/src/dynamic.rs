use latebind_registry::{Renderable, Scope};
use latebind_types::{ConfigError, Markup, Props, RenderError, merge_props};
use tracing::trace;

use crate::config::ComponentConfig;

/// A renderable that looks its target up by name at render time.
///
/// The config is parsed once, at construction. Rendering resolves the
/// canonical name in the scope's registry and renders the target with the
/// base props overridden by the runtime props.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicComponent {
    name: String,
    base_props: Props,
}

impl DynamicComponent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_props(&self) -> &Props {
        &self.base_props
    }
}

impl Renderable for DynamicComponent {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        render_bound(scope, &self.name, &self.base_props, props)
    }
}

/// Creates a late-bound component from a name or an inline config.
///
/// ```rust
/// use latebind_engine::component;
/// use latebind_types::Props;
///
/// let mut defaults = Props::new();
/// defaults.insert("greeting".into(), "Hello".into());
/// let hello = component("hello", Some(defaults))?;
/// assert_eq!(hello.name(), "Hello");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn component(config: impl Into<ComponentConfig>, default_props: Option<Props>) -> Result<DynamicComponent, ConfigError> {
    let (name, base_props) = config.into().into_parts(default_props.unwrap_or_default())?;
    Ok(DynamicComponent { name, base_props })
}

/// Resolves `name` in the scope and renders it with `base` overridden by
/// `overrides`. An unbound name is a hard error.
pub(crate) fn render_bound(scope: &Scope, name: &str, base: &Props, overrides: &Props) -> Result<Markup, RenderError> {
    let target = scope.resolve(name)?;
    let merged = merge_props(base, overrides);
    trace!(component = %name, prop_count = merged.len(), "rendering bound component");
    target.render(scope, &merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_registry::from_fn;
    use serde_json::{Value, json};

    fn props(value: Value) -> Props {
        value.as_object().cloned().expect("object literal")
    }

    fn echo_scope() -> Scope {
        let scope = Scope::isolated();
        scope
            .bind("echo", from_fn(|props: &Props| Markup::new(Value::Object(props.clone()).to_string())))
            .unwrap();
        scope
    }

    #[test]
    fn runtime_props_override_base_props_key_by_key() {
        let echo = component("echo", Some(props(json!({"a": 1, "b": 2})))).unwrap();
        let rendered = echo.render(&echo_scope(), &props(json!({"b": 3, "c": 4}))).unwrap();
        assert_eq!(rendered.as_str(), r#"{"a":1,"b":3,"c":4}"#);
    }

    #[test]
    fn unbound_name_fails_at_render_not_construction() {
        let missing = component("missing-widget", None).unwrap();
        assert_eq!(missing.name(), "MissingWidget");

        let error = missing.render(&echo_scope(), &Props::new()).unwrap_err();
        assert_eq!(error.to_string(), "No component bound to name: MissingWidget");
    }

    #[test]
    fn construction_rejects_bad_config() {
        assert_eq!(component(Props::new(), None), Err(ConfigError::Empty));
    }

    #[test]
    fn the_same_instance_renders_repeatedly() {
        let echo = component("echo", None).unwrap();
        let scope = echo_scope();
        let first = echo.render(&scope, &props(json!({"n": 1}))).unwrap();
        let second = echo.render(&scope, &props(json!({"n": 2}))).unwrap();
        assert_eq!(first.as_str(), r#"{"n":1}"#);
        assert_eq!(second.as_str(), r#"{"n":2}"#);
    }
}
