use std::fmt;
use std::sync::{Arc, Mutex};

use latebind_registry::{Renderable, Scope};
use latebind_types::{FetchError, Markup, Props, RenderError, Resolution};
use latebind_util::JsonFetcher;
use serde_json::Value;
use tokio::{runtime::Handle, sync::Notify, task::JoinHandle};
use tracing::debug;

use super::{RemoteComponent, interpret_payload};
use crate::dynamic::render_bound;

/// Renders the pending or failed state of a proxy, and a `null` payload.
pub type FallbackFn = dyn Fn(&Resolution) -> Result<Markup, RenderError> + Send + Sync;

/// Fetch bookkeeping for one mounted instance.
///
/// `generation` increments whenever the target changes; a completing fetch
/// only lands if its generation is still current and the instance is mounted.
#[derive(Debug, Default)]
struct FetchSlot {
    target: Option<String>,
    generation: u64,
    resolution: Resolution,
    task: Option<JoinHandle<()>>,
    torn_down: bool,
}

#[derive(Debug, Default)]
struct SharedState {
    slot: Mutex<FetchSlot>,
    changed: Notify,
}

impl SharedState {
    fn complete(&self, generation: u64, target: &str, result: Result<Value, FetchError>) {
        {
            let mut slot = self.slot.lock().expect("fetch slot lock");
            if slot.torn_down {
                debug!(url = %target, "discarding result for unmounted proxy");
                return;
            }
            if slot.generation != generation || slot.target.as_deref() != Some(target) {
                debug!(url = %target, generation, current = slot.generation, "discarding stale proxy result");
                return;
            }
            slot.resolution = match result {
                Ok(payload) => Resolution::Success(payload),
                Err(error) => {
                    debug!(url = %target, %error, "proxy fetch failed");
                    Resolution::Failure(error)
                }
            };
            slot.task = None;
        }
        self.changed.notify_one();
    }
}

/// A mounted remote proxy.
///
/// Each render expands the template from the render props. When the target
/// differs from the previous render, a fetch is spawned and any in-flight
/// fetch for the old target is aborted; its result is ignored if it still
/// arrives. Until a non-null payload is available the fallback renders with
/// the current [`Resolution`]; the default fallback renders nothing.
///
/// Dropping the instance (or calling [`ProxyInstance::unmount`]) aborts the
/// in-flight fetch and makes late results no-ops.
pub struct ProxyInstance {
    component: Arc<RemoteComponent>,
    fetcher: Arc<dyn JsonFetcher>,
    runtime: Handle,
    fallback: Option<Arc<FallbackFn>>,
    shared: Arc<SharedState>,
}

impl fmt::Debug for ProxyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyInstance")
            .field("template", &self.component.template().as_str())
            .field("slot", &self.shared.slot)
            .finish_non_exhaustive()
    }
}

impl ProxyInstance {
    pub(super) fn new(component: Arc<RemoteComponent>, fetcher: Arc<dyn JsonFetcher>, runtime: Handle) -> Self {
        Self {
            component,
            fetcher,
            runtime,
            fallback: None,
            shared: Arc::new(SharedState::default()),
        }
    }

    /// Sets the renderer used while pending and after a failed fetch.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&Resolution) -> Result<Markup, RenderError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn component(&self) -> &RemoteComponent {
        &self.component
    }

    /// Snapshot of the current resolution state.
    pub fn resolution(&self) -> Resolution {
        self.shared.slot.lock().expect("fetch slot lock").resolution.clone()
    }

    /// Target of the most recent render, if any.
    pub fn target(&self) -> Option<String> {
        self.shared.slot.lock().expect("fetch slot lock").target.clone()
    }

    /// Completes once the resolution has changed since it was last awaited.
    ///
    /// Schedulers use this as the signal to render the instance again.
    pub async fn changed(&self) {
        self.shared.changed.notified().await;
    }

    /// Tears the instance down. Equivalent to dropping it.
    pub fn unmount(self) {}

    /// Returns the resolution for `target`, starting a fetch when the target
    /// differs from the last one observed.
    fn observe(&self, target: &str) -> Resolution {
        let mut slot = self.shared.slot.lock().expect("fetch slot lock");
        if slot.target.as_deref() == Some(target) {
            return slot.resolution.clone();
        }

        if let Some(previous) = slot.task.take() {
            debug!(previous = ?slot.target, next = %target, "superseding in-flight proxy fetch");
            previous.abort();
        }
        slot.generation += 1;
        slot.target = Some(target.to_string());
        slot.resolution = Resolution::Pending;

        let generation = slot.generation;
        let shared = Arc::clone(&self.shared);
        let fetcher = Arc::clone(&self.fetcher);
        let url = target.to_string();
        debug!(%url, generation, "starting proxy fetch");
        slot.task = Some(self.runtime.spawn(async move {
            let result = fetcher.fetch_json(&url).await;
            shared.complete(generation, &url, result);
        }));

        Resolution::Pending
    }

    fn render_fallback(&self, resolution: &Resolution) -> Result<Markup, RenderError> {
        match &self.fallback {
            Some(fallback) => fallback(resolution),
            None => Ok(Markup::empty()),
        }
    }
}

impl Renderable for ProxyInstance {
    fn render(&self, scope: &Scope, props: &Props) -> Result<Markup, RenderError> {
        let params = self.component.configure_params(props);
        let target = self.component.template().expand(&params)?;
        let forwarded = self.component.forwarded_props(props);

        match self.observe(&target) {
            Resolution::Success(payload) if !payload.is_null() => {
                let (name, config_props) = interpret_payload(&payload)?;
                render_bound(scope, &name, &config_props, &forwarded)
            }
            other => self.render_fallback(&other),
        }
    }
}

impl Drop for ProxyInstance {
    fn drop(&mut self) {
        let Ok(mut slot) = self.shared.slot.lock() else {
            return;
        };
        slot.torn_down = true;
        if let Some(task) = slot.task.take() {
            debug!(url = ?slot.target, "aborting proxy fetch on unmount");
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot_at(shared: &SharedState, target: &str, generation: u64) {
        let mut slot = shared.slot.lock().unwrap();
        slot.target = Some(target.to_string());
        slot.generation = generation;
    }

    #[test]
    fn complete_applies_current_generation() {
        let shared = SharedState::default();
        slot_at(&shared, "/api?id=1", 1);

        shared.complete(1, "/api?id=1", Ok(json!({"hello": {}})));

        let slot = shared.slot.lock().unwrap();
        assert_eq!(slot.resolution, Resolution::Success(json!({"hello": {}})));
    }

    #[test]
    fn complete_discards_superseded_generation() {
        let shared = SharedState::default();
        slot_at(&shared, "/api?id=2", 2);

        shared.complete(1, "/api?id=1", Ok(json!({"stale": {}})));

        assert!(shared.slot.lock().unwrap().resolution.is_pending());
    }

    #[test]
    fn complete_discards_results_after_teardown() {
        let shared = SharedState::default();
        slot_at(&shared, "/api?id=1", 1);
        shared.slot.lock().unwrap().torn_down = true;

        shared.complete(
            1,
            "/api?id=1",
            Err(FetchError::Transport {
                url: "/api?id=1".into(),
                message: "reset".into(),
            }),
        );

        assert!(shared.slot.lock().unwrap().resolution.is_pending());
    }
}
