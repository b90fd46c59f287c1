//! Remote proxies: components whose identity is fetched at render time.
//!
//! A [`RemoteComponent`] holds the parsed URI template and the parameter
//! defaults. It is immutable and can be shared; rendering happens through a
//! [`ProxyInstance`] created by [`RemoteComponent::mount`], which owns the
//! fetch state for one place in the render tree.
//!
//! ```rust
//! use latebind_engine::proxy;
//! use latebind_types::{ParamMeta, ParamMetaMap, Props};
//! use serde_json::json;
//!
//! let mut params = ParamMetaMap::new();
//! params.insert("interval".into(), ParamMeta::with_default("month"));
//! let trend = proxy("/v/trend.json{?dataset,interval}", Some(params))?;
//!
//! let mut props = Props::new();
//! props.insert("dataset".into(), json!("admin:northwind-orders"));
//! assert_eq!(
//!     trend.href(&props)?,
//!     "/v/trend.json?dataset=admin%3Anorthwind-orders&interval=month"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod instance;

use std::sync::Arc;

use latebind_types::{ConfigError, ParamMetaMap, Props, RenderError, TemplateError};
use latebind_util::{JsonFetcher, UriTemplate};
use serde_json::Value;
use tokio::runtime::Handle;

use crate::config::{ComponentConfig, parse_config};

pub use instance::{FallbackFn, ProxyInstance};

/// Hypermedia envelope keys dropped from a payload before it is read as a config.
pub const ENVELOPE_KEYS: [&str; 2] = ["_links", "_embedded"];

/// Template descriptor for a remotely resolved component.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteComponent {
    template: UriTemplate,
    defaults: Props,
    param_names: Vec<String>,
}

/// Creates a remote proxy for `uri_template`.
///
/// Every parameter in `params` contributes its default (or `null`, which
/// expands as undefined) to the template values.
pub fn proxy(uri_template: &str, params: Option<ParamMetaMap>) -> Result<RemoteComponent, TemplateError> {
    let template = UriTemplate::parse(uri_template)?;
    let params = params.unwrap_or_default();

    let defaults = params
        .iter()
        .map(|(name, meta)| (name.clone(), meta.default.clone().unwrap_or(Value::Null)))
        .collect();

    let mut param_names: Vec<String> = template.variables().into_iter().map(str::to_string).collect();
    for name in params.keys() {
        if !param_names.contains(name) {
            param_names.push(name.clone());
        }
    }

    Ok(RemoteComponent {
        template,
        defaults,
        param_names,
    })
}

impl RemoteComponent {
    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn defaults(&self) -> &Props {
        &self.defaults
    }

    /// Names consumed by the request: template variables plus declared params.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Template values for `props`: defaults overlaid with `props`, with
    /// arrays and objects replaced by their JSON text.
    pub fn configure_params(&self, props: &Props) -> Props {
        let mut params = self.defaults.clone();
        for (key, value) in props {
            params.insert(key.clone(), value.clone());
        }
        for value in params.values_mut() {
            if value.is_array() || value.is_object() {
                *value = Value::String(value.to_string());
            }
        }
        params
    }

    /// The request target for `props`, without fetching.
    pub fn href(&self, props: &Props) -> Result<String, TemplateError> {
        self.template.expand(&self.configure_params(props))
    }

    /// `props` without the keys the request consumes.
    pub fn forwarded_props(&self, props: &Props) -> Props {
        props
            .iter()
            .filter(|(key, _)| !self.param_names.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Mounts an instance on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns [`RenderError::NoRuntime`] outside a Tokio runtime.
    pub fn mount(&self, fetcher: Arc<dyn JsonFetcher>) -> Result<ProxyInstance, RenderError> {
        let handle = Handle::try_current().map_err(|_| RenderError::NoRuntime {
            url: self.template.to_string(),
        })?;
        Ok(self.mount_with_handle(fetcher, handle))
    }

    /// Mounts an instance whose fetches are spawned on `handle`.
    pub fn mount_with_handle(&self, fetcher: Arc<dyn JsonFetcher>, handle: Handle) -> ProxyInstance {
        ProxyInstance::new(Arc::new(self.clone()), fetcher, handle)
    }
}

/// Reads a fetched payload as a component config.
///
/// Object payloads lose their `_links` and `_embedded` keys and the remaining
/// entries are parsed as an inline config. Any other payload is parsed
/// as-is, so a bare string names a component with no props.
pub fn interpret_payload(payload: &Value) -> Result<(String, Props), ConfigError> {
    match payload {
        Value::Object(entries) => {
            let config: Props = entries
                .iter()
                .filter(|(key, _)| !ENVELOPE_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            ComponentConfig::Inline(config).into_parts(Props::new())
        }
        other => parse_config(other, Props::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_types::ParamMeta;
    use serde_json::json;

    fn props(value: Value) -> Props {
        value.as_object().cloned().expect("object literal")
    }

    fn trend() -> RemoteComponent {
        let mut params = ParamMetaMap::new();
        params.insert("chartType".into(), ParamMeta::with_default("column"));
        params.insert("interval".into(), ParamMeta::default());
        proxy("http://localhost:3002/v/trend.json{?dataset,chartType,interval,x}", Some(params)).unwrap()
    }

    #[test]
    fn defaults_cover_every_declared_param() {
        let remote = trend();
        assert_eq!(remote.defaults(), &props(json!({"chartType": "column", "interval": null})));
    }

    #[test]
    fn explicit_props_win_over_defaults() {
        let remote = trend();
        let href = remote
            .href(&props(json!({"dataset": "admin:northwind-orders", "chartType": "line"})))
            .unwrap();
        assert_eq!(
            href,
            "http://localhost:3002/v/trend.json?dataset=admin%3Anorthwind-orders&chartType=line"
        );
    }

    #[test]
    fn configure_params_serializes_structured_values() {
        let remote = proxy("/api{?a,b,c}", None).unwrap();
        let params = remote.configure_params(&props(json!({"a": [1, 2], "b": {"k": "v"}, "c": 3})));
        assert_eq!(params["a"], json!("[1,2]"));
        assert_eq!(params["b"], json!(r#"{"k":"v"}"#));
        assert_eq!(params["c"], json!(3));
    }

    #[test]
    fn href_percent_encodes_serialized_arrays() {
        let remote = proxy("/api{?a}", None).unwrap();
        assert_eq!(remote.href(&props(json!({"a": [1, 2]}))).unwrap(), "/api?a=%5B1%2C2%5D");
    }

    #[test]
    fn forwarded_props_drop_template_and_declared_params() {
        let remote = trend();
        let forwarded = remote.forwarded_props(&props(json!({
            "dataset": "orders",
            "interval": "year",
            "className": "wide",
            "title": "Orders"
        })));
        assert_eq!(forwarded, props(json!({"className": "wide", "title": "Orders"})));
    }

    #[test]
    fn interpret_payload_strips_hypermedia_envelope() {
        let payload = json!({
            "_links": {"self": {"href": "/api/hello.json"}},
            "hello": {"greeting": "Hi"},
            "_embedded": {"items": []}
        });
        let parsed = interpret_payload(&payload).unwrap();
        assert_eq!(parsed, ("Hello".to_string(), props(json!({"greeting": "Hi"}))));
    }

    #[test]
    fn interpret_payload_rejects_envelope_only_payloads() {
        let payload = json!({"_links": {}});
        assert_eq!(interpret_payload(&payload), Err(ConfigError::Empty));
        assert_eq!(
            interpret_payload(&json!(true)),
            Err(ConfigError::UnsupportedType { found: "boolean" })
        );
    }

    #[test]
    fn interpret_payload_accepts_bare_names() {
        let parsed = interpret_payload(&json!("hello")).unwrap();
        assert_eq!(parsed, ("Hello".to_string(), Props::new()));
    }

    #[test]
    fn mount_requires_a_runtime() {
        struct NeverFetch;

        #[async_trait::async_trait]
        impl JsonFetcher for NeverFetch {
            async fn fetch_json(&self, url: &str) -> Result<Value, latebind_types::FetchError> {
                Err(latebind_types::FetchError::Transport {
                    url: url.to_string(),
                    message: "unreachable".into(),
                })
            }
        }

        let error = trend().mount(Arc::new(NeverFetch)).err().expect("no runtime");
        assert!(matches!(error, RenderError::NoRuntime { .. }));
    }
}
