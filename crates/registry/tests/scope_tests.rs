use std::sync::Arc;

use latebind_registry::{
    ComponentConsumer, ComponentProvider, ComponentRegistry, Renderable, Scope, from_fn, from_render_fn, with_components,
};
use latebind_types::{Markup, Props, RenderError};
use serde_json::json;

fn label(value: &'static str) -> impl Renderable + 'static {
    from_fn(move |_: &Props| Markup::new(value))
}

/// Resolves `Hello` in whatever scope it is rendered in.
fn late_hello() -> impl Renderable + 'static {
    from_render_fn(|scope: &Scope, props: &Props| scope.resolve("Hello")?.render(scope, props))
}

#[test]
fn provider_overrides_registry_for_its_subtree() {
    let outer = Arc::new(ComponentRegistry::new());
    outer.bind("hello", label("outer")).unwrap();
    let inner = Arc::new(ComponentRegistry::new());
    inner.bind("hello", label("inner")).unwrap();

    let scope = Scope::new(Arc::clone(&outer));
    let provided = ComponentProvider::new(Arc::clone(&inner), late_hello());

    assert_eq!(late_hello().render(&scope, &Props::new()).unwrap().as_str(), "outer");
    assert_eq!(provided.render(&scope, &Props::new()).unwrap().as_str(), "inner");
}

#[test]
fn scoped_registry_does_not_fall_back_to_parent() {
    let outer = Arc::new(ComponentRegistry::new());
    outer.bind("hello", label("outer")).unwrap();
    let empty = Arc::new(ComponentRegistry::new());

    let provided = ComponentProvider::new(empty, late_hello());
    let error = provided.render(&Scope::new(outer), &Props::new()).unwrap_err();

    assert_eq!(error.to_string(), "No component bound to name: Hello");
    assert!(matches!(error, RenderError::Binding(_)));
}

#[test]
fn with_scope_exposes_the_override_to_the_closure() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.bind("hello", label("scoped")).unwrap();

    let rendered = Scope::with_scope(Arc::clone(&registry), |scope| late_hello().render(scope, &Props::new())).unwrap();

    assert_eq!(rendered.as_str(), "scoped");
}

#[test]
fn consumer_receives_the_ambient_registry() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.bind("chart", label("chart")).unwrap();
    registry.bind("table", label("table")).unwrap();

    let consumer = ComponentConsumer::new(|components, _props| Ok(Markup::new(components.names().join(","))));
    let rendered = consumer.render(&Scope::new(registry), &Props::new()).unwrap();

    assert_eq!(rendered.as_str(), "Chart,Table");
}

#[test]
fn with_components_injects_names_and_lets_caller_props_win() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.bind("hello", label("hello")).unwrap();
    let scope = Scope::new(registry);

    let echo = with_components(from_fn(|props: &Props| Markup::new(props["components"].to_string())));

    let injected = echo.render(&scope, &Props::new()).unwrap();
    assert_eq!(injected.as_str(), r#"["Hello"]"#);

    let mut explicit = Props::new();
    explicit.insert("components".into(), json!("override"));
    let overridden = echo.render(&scope, &explicit).unwrap();
    assert_eq!(overridden.as_str(), r#""override""#);
}

#[test]
fn default_scope_reads_the_process_wide_registry() {
    latebind_registry::bind("scope-default-probe", label("probe")).unwrap();

    let scope = Scope::default();
    assert!(scope.is_default());
    let rendered = scope.resolve("ScopeDefaultProbe").unwrap().render(&scope, &Props::new()).unwrap();
    assert_eq!(rendered.as_str(), "probe");
    assert!(!Scope::isolated().is_default());
}
