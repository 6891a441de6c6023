use thiserror::Error;

/// Failure of a single route-matrix request.
///
/// The resolver treats every variant the same way: the affected batch is
/// skipped and counted. The variants exist so logs say what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// The request exceeded its deadline.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail reported by the client.
        message: String,
    },
    /// The connection failed after all retries.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Endpoint that was called.
        url: String,
        /// Error detail reported by the client.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to decode route matrix response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
}
