#![warn(missing_docs)]

//! The HTTP transport used to fetch schemas: a [`reqwest`] client exposed as a boxed
//! [`tower::Service`] with a timeout, plus a layer for adding headers

use std::time::Duration;

use buildstructor::Builder;
use bytes::Bytes;
use derive_getters::Getters;
use http_body_util::Full;
use tower::{timeout::error::Elapsed, util::BoxCloneSyncService};

pub mod body;
mod error;
pub mod extend_headers;
mod reqwest;

pub use error::HttpServiceError;
pub use reqwest::{ReqwestService, ReqwestServiceFactory};

/// Makes ring the process-wide rustls provider before `main`, since `reqwest` is built
/// without one
#[ctor::ctor]
fn install_ring_crypto_provider() {
    // fails only when a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// The timeout applied to requests when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// A request with its whole body in memory
pub type HttpRequest = http::Request<Full<Bytes>>;
/// A response with its whole body in memory
pub type HttpResponse<T = Bytes> = http::Response<T>;
/// The transport every fetcher sends its requests through
pub type HttpService = BoxCloneSyncService<HttpRequest, HttpResponse, HttpServiceError>;

/// Builds [`HttpService`]s
///
/// Calling a [`tower::Service`] takes `&mut self`, so fetchers ask for their own service
/// and stack their layers on it rather than sharing one.
pub trait HttpServiceFactory {
    /// Builds a new [`HttpService`]
    #[allow(clippy::result_large_err)]
    fn create(&self) -> Result<HttpService, HttpServiceError>;
}

/// Transport settings, independent of the client behind them
#[derive(Clone, Debug, Builder, Default, Getters)]
pub struct HttpServiceConfig {
    /// Skip certificate validation
    accept_invalid_certificates: Option<bool>,
    /// Skip hostname verification
    accept_invalid_hostnames: Option<bool>,
    /// Per-request timeout, [`DEFAULT_TIMEOUT`] when unset
    timeout: Option<Duration>,
}

impl From<Box<dyn std::error::Error + Send + Sync>> for HttpServiceError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        if err.is::<Elapsed>() {
            return HttpServiceError::TimedOut;
        }
        match err.downcast::<::reqwest::Error>() {
            Ok(err) => HttpServiceError::from(*err),
            Err(err) => match err.downcast::<HttpServiceError>() {
                Ok(err) => *err,
                Err(err) => HttpServiceError::Unexpected(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;
    use tower::timeout::error::Elapsed;

    use super::HttpServiceError;

    #[test]
    fn elapsed_errors_become_timeouts() {
        let err: Box<dyn std::error::Error + Send + Sync> = Box::new(Elapsed::new());
        assert_that!(HttpServiceError::from(err).is_timeout()).is_true();
    }

    #[test]
    fn boxed_http_service_errors_are_unwrapped() {
        let err: Box<dyn std::error::Error + Send + Sync> = Box::new(HttpServiceError::TimedOut);
        assert_that!(HttpServiceError::from(err)).matches(|err| err.is_timeout());
    }

    #[test]
    fn other_errors_are_unexpected() {
        let err: Box<dyn std::error::Error + Send + Sync> = "boom".into();
        assert_that!(HttpServiceError::from(err))
            .matches(|err| matches!(err, HttpServiceError::Unexpected(_)));
    }
}
