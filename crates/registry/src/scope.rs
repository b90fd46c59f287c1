use std::sync::Arc;

use latebind_types::{BindingError, InvalidName};

use crate::{ComponentRegistry, Renderable, SharedRenderable, default_registry};

/// Handle to the registry visible at a point in the render tree.
///
/// Every render call receives a `Scope`; components that render children
/// pass it down unchanged unless they deliberately establish an override
/// with [`Scope::with_scope`] or a [`crate::ComponentProvider`].
#[derive(Debug, Clone)]
pub struct Scope {
    registry: Arc<ComponentRegistry>,
}

impl Default for Scope {
    /// Scope over the process-wide default registry.
    fn default() -> Self {
        Self {
            registry: default_registry(),
        }
    }
}

impl Scope {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    /// Scope over a fresh, empty registry. Useful for tests.
    pub fn isolated() -> Self {
        Self::new(Arc::new(ComponentRegistry::new()))
    }

    /// Runs `render_subtree` with `registry` as the ambient registry.
    pub fn with_scope<T>(registry: Arc<ComponentRegistry>, render_subtree: impl FnOnce(&Scope) -> T) -> T {
        let scope = Scope::new(registry);
        render_subtree(&scope)
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_handle(&self) -> Arc<ComponentRegistry> {
        Arc::clone(&self.registry)
    }

    /// Whether this scope reads the process-wide default registry.
    pub fn is_default(&self) -> bool {
        Arc::ptr_eq(&self.registry, &default_registry())
    }

    /// Binds into this scope's registry.
    pub fn bind<R>(&self, name: &str, renderable: R) -> Result<String, InvalidName>
    where
        R: Renderable + 'static,
    {
        self.registry.bind(name, renderable)
    }

    /// Resolves an already canonical name against this scope's registry.
    pub fn resolve(&self, canonical_name: &str) -> Result<SharedRenderable, BindingError> {
        self.registry.resolve(canonical_name)
    }
}
