//! Error taxonomy for the opengrid crate
//!
//! Transport and resolution failures surface immediately to the caller; they
//! are never swallowed or retried here. Retry policy, if any, belongs to the
//! transport implementation.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when driving a grid device.
#[derive(Debug, Error)]
pub enum Error {
    /// No codec is registered for the protocol family the device resolved to.
    #[error("unsupported protocol family `{0}`")]
    UnsupportedProtocol(String),

    /// The underlying transport could not be opened or probed.
    #[error("transport open failed: {0}")]
    TransportOpen(#[source] std::io::Error),

    /// A transport read or write did not complete the expected byte count.
    #[error("transport i/o failed: {0}")]
    TransportIo(#[source] std::io::Error),

    /// An event-type ordinal outside the defined range was supplied.
    #[error("invalid event type ordinal {0} (valid ordinals are 0..=2)")]
    InvalidEventType(u8),

    /// A caller-supplied argument was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// A read or write that moved fewer bytes than the wire frame requires.
    pub(crate) fn short_transfer(expected: usize, transferred: usize) -> Self {
        Error::TransportIo(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("transferred {transferred} of {expected} bytes"),
        ))
    }
}
