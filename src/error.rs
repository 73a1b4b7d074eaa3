// Error taxonomy for the library.
//
// Contract violations (zero sizes, closed handles where an open one is
// required) panic instead of returning - they are programmer errors.
// Everything else is surfaced as a value; there is no retry path anywhere.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A graphics-API call returned a non-success result code.
    #[error("vulkan: {call} failed with {result}")]
    Graphics { call: &'static str, result: String },

    /// File access failed while acquiring a resource (shader binaries).
    #[error("failed to acquire {what}: {source}")]
    Resource {
        what: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation was invoked in a state that cannot serve it.
    #[error("{0}")]
    Logic(String),

    /// The window-system binding refused an operation.
    #[error("platform: {0}")]
    Platform(String),
}

impl Error {
    pub(crate) fn logic(message: impl Into<String>) -> Self {
        Error::Logic(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
