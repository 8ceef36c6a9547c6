use bytes::Bytes;
use http::StatusCode;

/// Errors produced by an [`crate::HttpService`]
#[derive(thiserror::Error, Debug)]
pub enum HttpServiceError {
    /// The server answered with a status code the caller refused
    #[error("Bad Status code: {status_code}")]
    BadStatusCode {
        /// The offending status code
        status_code: StatusCode,
        /// The body that came with it
        data: Bytes,
    },
    /// [`http`]-related error, usually while building a request
    #[error("HTTP Error: {:?}", .0)]
    Http(#[from] http::Error),
    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    TimedOut,
    /// The response body could not be decoded
    #[error("Decode error: {:?}", .0)]
    Decode(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// The request or response body could not be read
    #[error("Body error: {:?}", .0)]
    Body(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// No connection could be made to the server
    #[error("Connect error: {:?}", .0)]
    Connect(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// Any other failure of the underlying client
    #[error("Unexpected HTTP error: {:?}", .0)]
    Unexpected(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl HttpServiceError {
    /// Whether the error was a failure to connect
    pub const fn is_connect(&self) -> bool {
        matches!(self, HttpServiceError::Connect(_))
    }
    /// Whether the error was a timeout
    pub const fn is_timeout(&self) -> bool {
        matches!(self, HttpServiceError::TimedOut)
    }
    /// Whether the error was a decoding failure
    pub const fn is_decode(&self) -> bool {
        matches!(self, HttpServiceError::Decode(_))
    }
    /// Whether the error was caused by the response status
    pub const fn is_status(&self) -> bool {
        matches!(self, HttpServiceError::BadStatusCode { .. })
    }
}
