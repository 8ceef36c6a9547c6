//! Fetching the current schema of a graph from the schema registry

use graphql_client::{GraphQLQuery, QueryBody};
use http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};
use schema_fetch_graphql::{GraphQLLayer, GraphQLRequest, GraphQLServiceError};
use schema_fetch_http::{
    HttpService, HttpServiceFactory, ReqwestServiceFactory, extend_headers::ExtendHeadersLayer,
};
use serde::{Deserialize, Serialize};
use tower::{ServiceBuilder, ServiceExt};
use url::Url;

use crate::{
    FetchConfig, IntrospectionSchema, SchemaFetchError, SchemaFetchResult,
    remote::transport_error,
};

const REGISTRY_SCHEMA_QUERY: &str = include_str!("registry_schema_query.graphql");
const OPERATION_NAME: &str = "GetSchemaByTag";
const CURRENT_TAG: &str = "current";
const CLIENT_NAME: &str = "schema-fetch";

/// [`GraphQLQuery`] for the registry's schema-by-tag query
pub struct RegistrySchemaQuery;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegistrySchemaVariables {
    pub id: String,
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySchemaResponseData {
    #[serde(default)]
    pub service: Option<RegistryService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryService {
    #[serde(default)]
    pub schema: Option<RegistrySchema>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySchema {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(rename = "__schema", default)]
    pub introspection: Option<IntrospectionSchema>,
}

impl RegistrySchemaResponseData {
    fn into_schema(self) -> Option<IntrospectionSchema> {
        self.service?.schema?.introspection
    }
}

impl GraphQLQuery for RegistrySchemaQuery {
    type Variables = RegistrySchemaVariables;
    type ResponseData = RegistrySchemaResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: REGISTRY_SCHEMA_QUERY,
            operation_name: OPERATION_NAME,
        }
    }
}

/// The service identifier carried in an API key of the form `service:<id>:<secret>`
pub fn service_id_from_key(api_key: &str) -> SchemaFetchResult<String> {
    api_key
        .split(':')
        .nth(1)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(SchemaFetchError::InvalidApiKey)
}

/// Client for the schema registry
#[derive(Clone)]
pub struct RegistryClient {
    http_service: HttpService,
    endpoint: Url,
    client_version: String,
}

impl RegistryClient {
    pub fn new(
        http_service: HttpService,
        endpoint: Url,
        client_version: impl Into<String>,
    ) -> RegistryClient {
        RegistryClient {
            http_service,
            endpoint,
            client_version: client_version.into(),
        }
    }

    /// Builds a [`reqwest`]-backed client for the registry named in `config`
    pub fn from_config(config: &FetchConfig) -> SchemaFetchResult<RegistryClient> {
        let http_service = ReqwestServiceFactory::builder()
            .config(config.http().clone())
            .build()
            .create()
            .map_err(SchemaFetchError::BuildClient)?;
        Ok(RegistryClient::new(
            http_service,
            config.registry_url()?,
            config.client_version_or_default(),
        ))
    }

    /// Fetches the schema currently published for the graph `api_key` belongs to.
    ///
    /// Whatever the registry says when it has no schema to give is logged, not returned:
    /// every such case is reported as [`SchemaFetchError::Registry`].
    pub async fn fetch_schema(&self, api_key: &str) -> SchemaFetchResult<IntrospectionSchema> {
        let id = service_id_from_key(api_key)?;
        let headers = self
            .registry_headers(api_key)
            .map_err(|err| SchemaFetchError::InvalidHeader {
                name: "x-api-key".to_string(),
                msg: err.to_string(),
            })?;

        let url = self.endpoint.to_string();
        tracing::info!("fetching the {} schema of {} from {}", CURRENT_TAG, id, url);
        let service = ServiceBuilder::new()
            .layer(GraphQLLayer::new(self.endpoint.clone()))
            .layer(ExtendHeadersLayer::new(headers))
            .service(self.http_service.clone());
        let response = service
            .oneshot(GraphQLRequest::<RegistrySchemaQuery>::new(
                RegistrySchemaVariables {
                    id,
                    tag: CURRENT_TAG.to_string(),
                },
            ))
            .await;

        match response {
            Ok(data) => data.into_schema().ok_or_else(|| {
                tracing::debug!("registry response did not contain a schema");
                SchemaFetchError::Registry
            }),
            Err(err) => Err(registry_error(url, err)),
        }
    }

    fn registry_headers(&self, api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        // "apollographql-client-name" and "apollographql-client-version" identify
        // this client to the registry
        headers.insert(
            "apollographql-client-name",
            HeaderValue::from_static(CLIENT_NAME),
        );
        tracing::debug!(client_version = %self.client_version);
        headers.insert(
            "apollographql-client-version",
            HeaderValue::from_str(&self.client_version)?,
        );
        let mut api_key = HeaderValue::from_str(api_key)?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);
        Ok(headers)
    }
}

fn registry_error(
    url: String,
    err: GraphQLServiceError<RegistrySchemaResponseData>,
) -> SchemaFetchError {
    match err {
        GraphQLServiceError::NoData(_)
        | GraphQLServiceError::PartialError { .. }
        | GraphQLServiceError::Deserialization { .. } => {
            tracing::debug!(
                messages = ?err.graphql_messages(),
                "registry returned no schema: {}",
                err
            );
            SchemaFetchError::Registry
        }
        err => transport_error(url, err),
    }
}
