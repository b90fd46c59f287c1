//! Error types for component resolution.

use thiserror::Error;

/// A name that cannot be turned into a registry key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid component name: {name:?}")]
pub struct InvalidName {
    pub name: String,
}

/// Malformed component configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("component config must be a name or an object, got {found}")]
    UnsupportedType { found: &'static str },

    #[error("component config object is empty")]
    Empty,

    #[error("props for component '{name}' must be an object, got {found}")]
    InvalidProps { name: String, found: &'static str },

    #[error(transparent)]
    InvalidName(#[from] InvalidName),
}

/// A canonical name with nothing bound to it in the ambient registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No component bound to name: {name}")]
pub struct BindingError {
    pub name: String,
}

/// URI template parse or expansion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed expression starting at offset {offset} in template '{template}'")]
    UnclosedExpression { template: String, offset: usize },

    #[error("unexpected '}}' at offset {offset} in template '{template}'")]
    StrayClosingBrace { template: String, offset: usize },

    #[error("unsupported operator '{operator}' in template '{template}'")]
    UnsupportedOperator { template: String, operator: char },

    #[error("invalid variable specification '{spec}' in template '{template}'")]
    InvalidVariable { template: String, spec: String },

    #[error("prefix modifier cannot be applied to composite value of '{name}'")]
    PrefixOnComposite { name: String },
}

/// Failure reported by the fetch collaborator.
///
/// Carried inside [`crate::Resolution::Failure`], so it stays cloneable and
/// holds rendered messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from '{url}' is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// Error returned when rendering a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("component '{name}' failed to render: {message}")]
    Component { name: String, message: String },

    #[error("no async runtime available to fetch '{url}'")]
    NoRuntime { url: String },
}
