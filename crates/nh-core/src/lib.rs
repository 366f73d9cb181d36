//! Shared primitives used across the native-html crates.

use std::borrow::Cow;

/// Result alias used across the workspace.
pub type RenderResult<T> = Result<T, RenderError>;

/// Top-level error type.
///
/// Every variant carries a stable dotted `code` so hosts can match on the
/// failure class without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{code}: {message}")]
    InvalidConfig {
        code: &'static str,
        message: Cow<'static, str>,
    },

    /// A renderer refused to produce an element for a node.
    #[error("{code}: renderer for <{tag}> failed: {message}")]
    Renderer {
        code: &'static str,
        tag: String,
        message: Cow<'static, str>,
    },

    #[error("{code}: resource `{uri}` unavailable: {message}")]
    Resource {
        code: &'static str,
        uri: String,
        message: Cow<'static, str>,
    },

    #[error("{code}: {message}")]
    Markup {
        code: &'static str,
        message: Cow<'static, str>,
    },
}

impl RenderError {
    pub fn invalid_config(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfig {
            code,
            message: message.into(),
        }
    }

    pub fn renderer(
        code: &'static str,
        tag: impl Into<String>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Renderer {
            code,
            tag: tag.into(),
            message: message.into(),
        }
    }

    pub fn resource(
        code: &'static str,
        uri: impl Into<String>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Resource {
            code,
            uri: uri.into(),
            message: message.into(),
        }
    }

    pub fn markup(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Markup {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { code, .. }
            | Self::Renderer { code, .. }
            | Self::Resource { code, .. }
            | Self::Markup { code, .. } => code,
        }
    }
}
