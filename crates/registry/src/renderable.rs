use std::fmt;
use std::sync::Arc;

use latebind_types::{Markup, Props, RenderError};

use crate::Scope;

/// A unit of UI content instantiated with a property bag.
///
/// The scope is passed explicitly so implementations that resolve other
/// components by name see the same registry as their caller.
pub trait Renderable: Send + Sync {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError>;
}

/// Shared handle stored in registries.
pub type SharedRenderable = Arc<dyn Renderable>;

impl<T: Renderable + ?Sized> Renderable for Arc<T> {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        (**self).render(scope, props)
    }
}

impl<T: Renderable + ?Sized> Renderable for Box<T> {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        (**self).render(scope, props)
    }
}

/// Adapter turning a closure into a [`Renderable`].
pub struct FnRenderable<F> {
    render_fn: F,
}

impl<F> fmt::Debug for FnRenderable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRenderable").finish_non_exhaustive()
    }
}

impl<F> Renderable for FnRenderable<F>
where
    F: Fn(&Scope, &Props) -> Result<Markup, RenderError> + Send + Sync,
{
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        (self.render_fn)(scope, props)
    }
}

/// Wraps an infallible leaf component that only looks at its props.
pub fn from_fn<F>(render_fn: F) -> FnRenderable<impl Fn(&Scope, &Props) -> Result<Markup, RenderError> + Send + Sync>
where
    F: Fn(&Props) -> Markup + Send + Sync,
{
    FnRenderable {
        render_fn: move |_: &Scope, props: &Props| -> Result<Markup, RenderError> { Ok(render_fn(props)) },
    }
}

/// Wraps a closure with full access to the scope and error channel.
pub fn from_render_fn<F>(render_fn: F) -> FnRenderable<F>
where
    F: Fn(&Scope, &Props) -> Result<Markup, RenderError> + Send + Sync,
{
    FnRenderable { render_fn }
}
