//! Registry crate for late-bound components.
//!
//! Components are looked up by a canonical name in a [`ComponentRegistry`].
//! The registry visible to a render call is carried explicitly by a
//! [`Scope`]; with no override, scopes point at the process-wide default
//! registry that [`bind`] writes to.
//!
//! ```rust
//! use latebind_registry::{ComponentRegistry, Scope, from_fn};
//! use latebind_types::{Markup, Props};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ComponentRegistry::new());
//! registry.bind("hello", from_fn(|props: &Props| Markup::new(format!("Hi {}", props["first"]))))?;
//!
//! let scope = Scope::new(registry);
//! let _hello = scope.resolve("Hello")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod naming;
pub mod provider;
pub mod registry;
pub mod renderable;
pub mod scope;

pub use naming::canonicalize;
pub use provider::{ComponentConsumer, ComponentProvider, WithComponents, with_components};
pub use registry::{ComponentRegistry, bind, bind_shared, default_registry};
pub use renderable::{FnRenderable, Renderable, SharedRenderable, from_fn, from_render_fn};
pub use scope::Scope;
