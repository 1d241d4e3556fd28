//! Errors raised while loading programs and challenges.

use thiserror::Error;

/// Errors that occur while reading a program or challenge definition.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input is not valid JSON for the expected shape.
    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No built-in challenge has the requested id.
    #[error("unknown challenge '{0}'")]
    UnknownChallenge(String),
}

impl LoadError {
    pub(crate) fn json(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| LoadError::Json { what, source }
    }
}
