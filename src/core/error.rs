//! Error handling - one flat hierarchy for signing and dispatch

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Client error hierarchy
#[derive(Debug, Error)]
pub enum Error {
    /// Transmission attempted before the request was signed
    #[error("Request is not signed")]
    UnsignedRequest,

    /// Request was signed for a different host or path than it is sent to
    #[error("Request signed for {signed_for} but dispatched to {dispatch_to}")]
    ContextMismatch {
        signed_for: String,
        dispatch_to: String,
    },

    /// Connection, TLS or timeout failure from the transport
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response body could not be fully read
    #[error("Response read error: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// Malformed host or path
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}
