use std::fmt;

use async_trait::async_trait;
use http::HeaderMap;
use schema_fetch_graphql::{GraphQLLayer, GraphQLRequest, GraphQLServiceError};
use schema_fetch_http::{
    HttpService, HttpServiceError, HttpServiceFactory, ReqwestServiceFactory,
    extend_headers::ExtendHeadersLayer,
};
use tower::{ServiceBuilder, ServiceExt};
use url::Url;

use crate::{
    FetchConfig, IntrospectionSchema, SchemaFetchError, SchemaFetchResult,
    introspection::{IntrospectionQuery, IntrospectionResponseData, IntrospectionVariables},
};

/// Runs the introspection query against a live GraphQL endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntrospectEndpoint {
    async fn introspect_endpoint(
        &self,
        endpoint: Url,
        headers: HeaderMap,
    ) -> SchemaFetchResult<IntrospectionSchema>;
}

/// [`IntrospectEndpoint`] over HTTP
#[derive(Clone)]
pub struct RemoteIntrospector {
    http_service: HttpService,
}

impl RemoteIntrospector {
    pub const fn new(http_service: HttpService) -> RemoteIntrospector {
        RemoteIntrospector { http_service }
    }

    /// Builds a [`reqwest`]-backed introspector from `config`
    pub fn from_config(config: &FetchConfig) -> SchemaFetchResult<RemoteIntrospector> {
        let http_service = ReqwestServiceFactory::builder()
            .config(config.http().clone())
            .build()
            .create()
            .map_err(SchemaFetchError::BuildClient)?;
        Ok(RemoteIntrospector::new(http_service))
    }
}

#[async_trait]
impl IntrospectEndpoint for RemoteIntrospector {
    async fn introspect_endpoint(
        &self,
        endpoint: Url,
        headers: HeaderMap,
    ) -> SchemaFetchResult<IntrospectionSchema> {
        let url = endpoint.to_string();
        tracing::info!("introspecting {}", url);
        let service = ServiceBuilder::new()
            .layer(GraphQLLayer::new(endpoint))
            .layer(ExtendHeadersLayer::new(headers))
            .service(self.http_service.clone());

        let response = service
            .oneshot(GraphQLRequest::<IntrospectionQuery>::new(
                IntrospectionVariables {},
            ))
            .await;

        match response {
            Ok(IntrospectionResponseData {
                schema: Some(schema),
            }) => Ok(schema),
            Ok(IntrospectionResponseData { schema: None }) => {
                Err(SchemaFetchError::MissingSchema { url })
            }
            Err(err) => Err(introspection_error(url, err)),
        }
    }
}

/// Surfaces GraphQL errors verbatim, even if the endpoint also sent partial data
fn introspection_error(
    url: String,
    err: GraphQLServiceError<IntrospectionResponseData>,
) -> SchemaFetchError {
    match err {
        GraphQLServiceError::NoData(errors) if errors.is_empty() => {
            SchemaFetchError::MissingSchema { url }
        }
        GraphQLServiceError::NoData(errors) | GraphQLServiceError::PartialError { errors, .. } => {
            SchemaFetchError::RemoteExecution {
                errors: errors.as_slice().into(),
            }
        }
        GraphQLServiceError::Deserialization {
            error, status_code, ..
        } => SchemaFetchError::InvalidResponse {
            url,
            status: status_code,
            source: error,
        },
        err => transport_error(url, err),
    }
}

/// Reports a request to `url` that failed before a GraphQL response came back
pub(crate) fn transport_error<T>(url: String, err: GraphQLServiceError<T>) -> SchemaFetchError
where
    T: Send + Sync + fmt::Debug + 'static,
{
    let source = match err {
        GraphQLServiceError::UpstreamService(err) => err.into(),
        GraphQLServiceError::Http(err) => err.into(),
        err => HttpServiceError::Unexpected(Box::new(err)),
    };
    SchemaFetchError::Http { url, source }
}
