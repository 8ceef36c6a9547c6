#![warn(missing_docs)]

//! [`tower`] middleware that speaks GraphQL over an [`HttpService`](schema_fetch_http::HttpService)
//!
//! A [`GraphQLLayer`] turns a [`GraphQLRequest`] into a JSON `POST` to a fixed endpoint and
//! decodes the answer into the query's `ResponseData`. Anything but clean data comes back as
//! a [`GraphQLServiceError`].

use std::{fmt, future::Future, pin::Pin, str::FromStr};

use bytes::Bytes;
use graphql_client::{GraphQLQuery, QueryBody};
use http::{header::CONTENT_TYPE, uri::InvalidUri, HeaderValue, Method, StatusCode, Uri};
use http_body_util::Full;
use schema_fetch_http::{HttpRequest, HttpResponse};
use serde::Serialize;
use tower::{Layer, Service};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// The GraphQL response envelope, `{ data, errors }`
pub type GraphQLResponse<T> = graphql_client::Response<T>;

/// Ways a GraphQL round trip can fail
#[derive(thiserror::Error, Debug)]
pub enum GraphQLServiceError<T: Send + Sync + fmt::Debug> {
    /// `data` was absent or null. Carries whatever `errors` came with it.
    #[error("The response carried no data")]
    NoData(Vec<graphql_client::Error>),
    /// `data` was present, but so was a non-empty `errors` list
    #[error("The response carried data and errors: {}", error_messages(.errors).join(" "))]
    PartialError {
        /// What the server did resolve
        data: T,
        /// What the server reported
        errors: Vec<graphql_client::Error>,
    },
    /// The variables could not be encoded
    #[error("Could not encode the request: {0}")]
    Serialization(serde_json::Error),
    /// The body was not a GraphQL response
    #[error("Could not decode the response (status {status_code}): {error}")]
    Deserialization {
        /// Why decoding failed
        error: serde_json::Error,
        /// The raw body
        data: Bytes,
        /// The status the body came with
        status_code: StatusCode,
    },
    /// The HTTP request could not be assembled
    #[error("Could not build the request: {0}")]
    Http(#[from] http::Error),
    /// The endpoint is not a valid [`Uri`]
    #[error("The endpoint is not a valid URI: {0}")]
    InvalidUri(#[from] InvalidUri),
    /// The HTTP service underneath failed
    #[error("The request failed: {0}")]
    UpstreamService(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl<T: Send + Sync + fmt::Debug> GraphQLServiceError<T> {
    /// The messages of the GraphQL errors carried by this error, if any
    pub fn graphql_messages(&self) -> Vec<String> {
        match self {
            GraphQLServiceError::NoData(errors) | GraphQLServiceError::PartialError { errors, .. } => {
                error_messages(errors)
            }
            _ => Vec::new(),
        }
    }
}

/// Collects the `message` of every [`graphql_client::Error`], in order
pub fn error_messages(errors: &[graphql_client::Error]) -> Vec<String> {
    errors.iter().map(|err| err.message.clone()).collect()
}

/// The variables of a [`GraphQLQuery`], addressed to a [`GraphQLService`]
pub struct GraphQLRequest<Q: GraphQLQuery> {
    variables: Q::Variables,
}

impl<Q: GraphQLQuery> GraphQLRequest<Q> {
    /// Wraps `variables`
    pub const fn new(variables: Q::Variables) -> GraphQLRequest<Q> {
        GraphQLRequest { variables }
    }

    /// Unwraps the variables
    pub fn into_inner(self) -> Q::Variables {
        self.variables
    }
}

/// Produces [`GraphQLService`]s that send every query to `endpoint`
#[derive(Clone, Debug)]
pub struct GraphQLLayer {
    endpoint: Url,
}

impl GraphQLLayer {
    /// Targets `endpoint`
    pub const fn new(endpoint: Url) -> GraphQLLayer {
        GraphQLLayer { endpoint }
    }
}

impl<S> Layer<S> for GraphQLLayer {
    type Service = GraphQLService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GraphQLService::new(self.endpoint.clone(), inner)
    }
}

/// Sends [`GraphQLRequest`]s through an HTTP service `S`
#[derive(Clone, Debug)]
pub struct GraphQLService<S> {
    endpoint: Url,
    inner: S,
}

impl<S> GraphQLService<S> {
    /// Wraps `inner`, targeting `endpoint`
    pub const fn new(endpoint: Url, inner: S) -> GraphQLService<S> {
        GraphQLService { endpoint, inner }
    }
}

impl<Q, S> Service<GraphQLRequest<Q>> for GraphQLService<S>
where
    Q: GraphQLQuery + Send + Sync + 'static,
    Q::Variables: Send,
    Q::ResponseData: Send + Sync + fmt::Debug,
    S: Service<HttpRequest, Response = HttpResponse> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = Q::ResponseData;
    type Error = GraphQLServiceError<Q::ResponseData>;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|err| GraphQLServiceError::UpstreamService(Box::new(err)))
    }

    fn call(&mut self, req: GraphQLRequest<Q>) -> Self::Future {
        // the clone may not be ready, so keep it and send through the one that is
        let cloned = self.inner.clone();
        let mut ready = std::mem::replace(&mut self.inner, cloned);
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let body = Q::build_query(req.into_inner());
            tracing::debug!(operation = body.operation_name, %endpoint, "sending GraphQL request");
            let request = encode_request(&endpoint, &body)?;
            let response = ready
                .call(request)
                .await
                .map_err(|err| GraphQLServiceError::UpstreamService(Box::new(err)))?;
            decode_response(response)
        })
    }
}

fn encode_request<V, T>(
    endpoint: &Url,
    body: &QueryBody<V>,
) -> Result<HttpRequest, GraphQLServiceError<T>>
where
    V: Serialize,
    T: Send + Sync + fmt::Debug,
{
    let bytes = serde_json::to_vec(body).map_err(GraphQLServiceError::Serialization)?;
    let request = http::Request::builder()
        .method(Method::POST)
        .uri(Uri::from_str(endpoint.as_str())?)
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
        .body(Full::new(Bytes::from(bytes)))?;
    Ok(request)
}

/// Splits a GraphQL response into data or an error; an empty `errors` list counts as none
fn decode_response<T>(response: HttpResponse) -> Result<T, GraphQLServiceError<T>>
where
    T: for<'de> serde::Deserialize<'de> + Send + Sync + fmt::Debug,
{
    let status_code = response.status();
    let body = response.into_body();
    let decoded: GraphQLResponse<T> =
        serde_json::from_slice(&body).map_err(|error| GraphQLServiceError::Deserialization {
            error,
            data: body.clone(),
            status_code,
        })?;

    let errors = decoded.errors.unwrap_or_default();
    match decoded.data {
        Some(data) if errors.is_empty() => Ok(data),
        Some(data) => Err(GraphQLServiceError::PartialError { data, errors }),
        None => Err(GraphQLServiceError::NoData(errors)),
    }
}
