//! Decoder failure mapping.

use http::StatusCode;

/// Failure reported by the transport's request decoder.
///
/// Transports insert this as a request extension when the inbound bytes
/// could not be framed; the admission filter maps it to a status before any
/// other validation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingError {
    /// The framed request exceeded the decoder's length limit.
    OverLength,
    /// Transfer decompression failed.
    Compression,
    /// The request did not arrive within the read timeout.
    Timeout,
    /// Any other framing failure.
    Malformed,
}

impl FramingError {
    /// The status the admission filter answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            FramingError::OverLength => StatusCode::PAYLOAD_TOO_LARGE,
            FramingError::Compression => StatusCode::BAD_REQUEST,
            FramingError::Timeout => StatusCode::REQUEST_TIMEOUT,
            FramingError::Malformed => StatusCode::BAD_REQUEST,
        }
    }
}
