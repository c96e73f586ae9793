//! Error type shared by every fetch operation.
//!
//! [`FetchError`] carries a human-readable message, the HTTP status code
//! when a response was received, and the request URL. Decoder failures
//! that are not JSON syntax errors pass through unchanged in the
//! [`FetchError::Json`] and [`FetchError::Xml`] variants.

use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed, so no request was sent.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The GET could not be completed (DNS, connect, TLS, I/O).
    #[error("{source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived with a status other than 200, or its JSON body
    /// was syntactically invalid.
    #[error("{message}")]
    Status {
        /// Either `Get {url} -> {status}` or `JSON syntax error at {url}`.
        message: String,
        /// The received HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The response body failed while being read after a 200 status.
    #[error("{source}")]
    Body {
        /// The received HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
        /// The underlying read error.
        #[source]
        source: reqwest::Error,
    },

    /// A batch task stopped before reporting an outcome for its URL.
    #[error("download of {url} ended without a result")]
    Interrupted {
        /// The URL whose task never reported.
        url: String,
    },

    /// JSON decoded cleanly but did not match the target type.
    #[error(transparent)]
    Json(serde_json::Error),

    /// XML decoding failed.
    #[error(transparent)]
    Xml(quick_xml::DeError),
}

impl FetchError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a status error with the standard `Get {url} -> {status}` message.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        Self::Status {
            message: format!("Get {url} -> {status}"),
            status,
            url,
        }
    }

    /// Creates a status-shaped error for a body that is not valid JSON.
    pub fn json_syntax(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        Self::Status {
            message: format!("JSON syntax error at {url}"),
            status,
            url,
        }
    }

    /// Creates an error for a batch task that never reported.
    pub fn interrupted(url: impl Into<String>) -> Self {
        Self::Interrupted { url: url.into() }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, status: u16, source: reqwest::Error) -> Self {
        Self::Body {
            status,
            url: url.into(),
            source,
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code of the response, or `None` when no response was
    /// received or the error came straight from a decoder.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Body { status, .. } => Some(*status),
            Self::InvalidUrl { .. }
            | Self::Transport { .. }
            | Self::Interrupted { .. }
            | Self::Json(_)
            | Self::Xml(_) => None,
        }
    }

    /// The requested URL. Unwrapped decoder errors carry none.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { url }
            | Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::Interrupted { url } => Some(url),
            Self::Json(_) | Self::Xml(_) => None,
        }
    }
}

// No `From` impls: transport variants need the request URL, and JSON errors
// must be classified (syntax vs data) before they become a `FetchError`.
