//! # Latebind Engine
//!
//! Late-bound component resolution. A UI declares a slot with a component
//! config or a URI template; the concrete component is chosen at render time
//! from the registry carried by the render [`Scope`](latebind_registry::Scope).
//!
//! ## Resolution paths
//!
//! - **By name**: `component("hello", Some(defaults))`
//! - **Inline config**: `component(ComponentConfig::Inline(entries), None)`
//! - **Remote**: `proxy("/api/hello.json{?id}", None)?.mount(fetcher)?` fetches a
//!   config from the expanded URL and renders it like `component` would
//!
//! ## Architecture
//!
//! - **`config`**: config normalization into `(canonical name, props)`
//! - **`dynamic`**: the name-resolving renderable returned by [`component`]
//! - **`proxy`**: URI template descriptors, payload interpretation and
//!   mounted proxy instances

pub mod config;
pub mod dynamic;
pub mod proxy;

pub use config::{ComponentConfig, parse_config};
pub use dynamic::{DynamicComponent, component};
pub use latebind_registry::{
    ComponentConsumer, ComponentProvider, ComponentRegistry, Renderable, Scope, bind, canonicalize, with_components,
};
pub use proxy::{ENVELOPE_KEYS, FallbackFn, ProxyInstance, RemoteComponent, interpret_payload, proxy};
