//! Utilities shared by the engine and the CLI: URI templates, the JSON
//! fetch collaborator, and remote settings.

pub mod http;
pub mod settings;
pub mod uri_template;

pub use http::{HttpJsonFetcher, JsonFetcher};
pub use settings::{RemoteSettings, SettingsError, SettingsOverrides};
pub use uri_template::UriTemplate;
