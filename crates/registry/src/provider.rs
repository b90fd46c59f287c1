//! Scope provider and consumer renderables.
//!
//! - `ComponentProvider`: renders a child with an overriding registry
//! - `ComponentConsumer`: hands the ambient registry to a render closure
//! - `WithComponents`: injects the ambient component names as a prop

use std::fmt;
use std::sync::Arc;

use latebind_types::{Markup, Props, RenderError};
use serde_json::Value;

use crate::{ComponentRegistry, Renderable, Scope, SharedRenderable};

/// Renders `child` with `registry` as the ambient registry for its subtree.
pub struct ComponentProvider {
    registry: Arc<ComponentRegistry>,
    child: SharedRenderable,
}

impl fmt::Debug for ComponentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentProvider").field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl ComponentProvider {
    pub fn new(registry: Arc<ComponentRegistry>, child: impl Renderable + 'static) -> Self {
        Self {
            registry,
            child: Arc::new(child),
        }
    }
}

impl Renderable for ComponentProvider {
    fn render(&self, _scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        Scope::with_scope(Arc::clone(&self.registry), |scope| self.child.render(scope, props))
    }
}

type ConsumerFn = dyn Fn(&ComponentRegistry, &Props) -> Result<Markup, RenderError> + Send + Sync;

/// Render-prop style access to the ambient registry.
pub struct ComponentConsumer {
    render_fn: Box<ConsumerFn>,
}

impl fmt::Debug for ComponentConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConsumer").finish_non_exhaustive()
    }
}

impl ComponentConsumer {
    pub fn new<F>(render_fn: F) -> Self
    where
        F: Fn(&ComponentRegistry, &Props) -> Result<Markup, RenderError> + Send + Sync + 'static,
    {
        Self {
            render_fn: Box::new(render_fn),
        }
    }
}

impl Renderable for ComponentConsumer {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        (self.render_fn)(scope.registry(), props)
    }
}

/// Wrapper produced by [`with_components`].
pub struct WithComponents {
    inner: SharedRenderable,
}

impl fmt::Debug for WithComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithComponents").finish_non_exhaustive()
    }
}

impl Renderable for WithComponents {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        let mut injected = Props::new();
        let names = scope.registry().names().into_iter().map(Value::String).collect();
        injected.insert("components".to_string(), Value::Array(names));
        for (key, value) in props {
            injected.insert(key.clone(), value.clone());
        }
        self.inner.render(scope, &injected)
    }
}

/// Wraps `inner` so it receives the ambient registry's bound names as a
/// `components` prop. Caller props are applied after, so an explicit
/// `components` prop wins.
pub fn with_components(inner: impl Renderable + 'static) -> WithComponents {
    WithComponents { inner: Arc::new(inner) }
}
