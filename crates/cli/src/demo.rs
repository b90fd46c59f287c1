//! Leaf components the CLI binds so configs have something to resolve to.

use latebind_registry::{Scope, from_fn};
use latebind_types::{InvalidName, Markup, Props};
use serde_json::Value;

/// Binds the demo components into `scope`'s registry.
pub fn register(scope: &Scope) -> Result<(), InvalidName> {
    scope.bind("hello", from_fn(hello))?;
    scope.bind("highchart", from_fn(highchart))?;
    Ok(())
}

fn text<'a>(props: &'a Props, key: &str) -> &'a str {
    props.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn hello(props: &Props) -> Markup {
    let body = format!("{}, {} {}", text(props, "greeting"), text(props, "first"), text(props, "last"));
    match props.get("className").and_then(Value::as_str) {
        Some(class_name) => Markup::new(format!(r#"<span class="{class_name}">{body}</span>"#)),
        None => Markup::new(format!("<span>{body}</span>")),
    }
}

/// Chart placeholder: dumps its props so the resolved configuration is visible.
fn highchart(props: &Props) -> Markup {
    Markup::new(format!("<div>{}</div>", Value::Object(props.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn demo_components_resolve_by_canonical_name() {
        let scope = Scope::isolated();
        register(&scope).unwrap();
        assert_eq!(scope.registry().names(), vec!["Hello".to_string(), "Highchart".to_string()]);
    }

    #[test]
    fn highchart_renders_its_props_as_json() {
        let props = json!({"title": "Orders"}).as_object().cloned().unwrap();
        assert_eq!(highchart(&props).as_str(), r#"<div>{"title":"Orders"}</div>"#);
    }
}
