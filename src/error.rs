use thiserror::Error;

/// Error kinds produced by the node-monitor core.
///
/// Only [`Error::Bind`] and [`Error::Config`] are allowed to propagate out of
/// `main`; every other variant is recovered from internally (see spec §7).
#[derive(Debug, Error)]
pub enum Error {
    /// A `getTask` RPC to a scheduler failed (connection refused, codec
    /// error, socket timeout). The caller drops the pooled client and
    /// treats the reservation as no-task.
    #[error("transport error talking to scheduler at {address}: {source}")]
    Transport {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// A `launchTask` call to the local application backend failed.
    #[error("transport error calling application backend at {address}: {source}")]
    BackendTransport {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// The application backend answered `launchTask` with a non-2xx status.
    /// `detail` is the response body re-serialized as JSON text when the
    /// backend sent one, or the bare status line otherwise.
    #[error("application backend at {address} rejected launchTask ({status}): {detail}")]
    BackendRejected { address: String, status: u16, detail: String },

    /// The inbound `enqueueTaskReservations` request was malformed.
    #[error("malformed reservation request: {0}")]
    MalformedRequest(String),

    /// Startup failed to bind a listening socket.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
