use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use latebind_types::{BindingError, InvalidName};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{Renderable, SharedRenderable, canonicalize};

static DEFAULT_REGISTRY: Lazy<Arc<ComponentRegistry>> = Lazy::new(|| Arc::new(ComponentRegistry::new()));

/// Mapping from canonical component name to renderable.
///
/// ## Lifecycle
///
/// Registries start empty and are filled through [`ComponentRegistry::bind`]
/// during setup. Entries are never removed; binding an existing name replaces
/// the previous renderable (last write wins), which is what tests and tools
/// use for hot rebinding.
///
/// ## Concurrency
///
/// Each bind is a single map write under a `RwLock`, so readers never see a
/// partially written entry. Reads clone the `Arc` out of the map and render
/// without holding the lock.
///
/// ## Scoping
///
/// There is no parent chain. A scoped registry fully replaces the default for
/// the subtree it is provided to; use [`ComponentRegistry::inherit`] to start
/// a scoped registry from a parent's bindings.
#[derive(Default)]
pub struct ComponentRegistry {
    components: RwLock<HashMap<String, SharedRenderable>>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry").field("names", &self.names()).finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `parent`'s bindings in a new, independent registry.
    ///
    /// Later binds on either registry are not visible to the other.
    pub fn inherit(parent: &ComponentRegistry) -> Self {
        let components = parent.components.read().expect("registry lock").clone();
        Self {
            components: RwLock::new(components),
        }
    }

    /// Binds `renderable` under the canonical form of `name`.
    ///
    /// Returns the canonical name the renderable was stored under.
    pub fn bind<R>(&self, name: &str, renderable: R) -> Result<String, InvalidName>
    where
        R: Renderable + 'static,
    {
        self.bind_shared(name, Arc::new(renderable))
    }

    /// Same as [`ComponentRegistry::bind`] for an already shared renderable.
    pub fn bind_shared(&self, name: &str, renderable: SharedRenderable) -> Result<String, InvalidName> {
        let canonical = canonicalize(name)?;
        let replaced = self
            .components
            .write()
            .expect("registry lock")
            .insert(canonical.clone(), renderable)
            .is_some();
        debug!(name = %name, canonical = %canonical, replaced, "component bound");
        Ok(canonical)
    }

    /// Looks up an already canonical name.
    pub fn get(&self, canonical_name: &str) -> Option<SharedRenderable> {
        self.components.read().expect("registry lock").get(canonical_name).cloned()
    }

    /// Looks up an already canonical name, failing loudly when it is unbound.
    pub fn resolve(&self, canonical_name: &str) -> Result<SharedRenderable, BindingError> {
        self.get(canonical_name).ok_or_else(|| {
            debug!(canonical = %canonical_name, "component lookup missed");
            BindingError {
                name: canonical_name.to_string(),
            }
        })
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.components.read().expect("registry lock").contains_key(canonical_name)
    }

    pub fn len(&self) -> usize {
        self.components.read().expect("registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound canonical names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.read().expect("registry lock").keys().cloned().collect();
        names.sort();
        names
    }
}

/// The process-wide registry used when no scope override is in effect.
pub fn default_registry() -> Arc<ComponentRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Binds a component in the process-wide default registry.
pub fn bind<R>(name: &str, renderable: R) -> Result<String, InvalidName>
where
    R: Renderable + 'static,
{
    DEFAULT_REGISTRY.bind(name, renderable)
}

/// Binds an already shared component in the process-wide default registry.
pub fn bind_shared(name: &str, renderable: SharedRenderable) -> Result<String, InvalidName> {
    DEFAULT_REGISTRY.bind_shared(name, renderable)
}
