use std::{collections::HashMap, str::FromStr};

use buildstructor::buildstructor;
use derive_getters::Getters;
use http::{HeaderMap, HeaderName, HeaderValue};
use schema_fetch_http::HttpServiceConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{SchemaFetchError, SchemaFetchResult};

/// Where the default registry lives
pub const DEFAULT_REGISTRY_ENDPOINT: &str = "https://engine-graphql.apollographql.com/api/graphql";

/// Where and how to reach a schema.
///
/// `url` may be a path to a local schema file or the URL of a GraphQL endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    headers: Vec<HashMap<String, String>>,
}

#[buildstructor]
impl EndpointConfig {
    #[builder]
    pub fn new(url: Option<String>, headers: Vec<HashMap<String, String>>) -> EndpointConfig {
        EndpointConfig { url, headers }
    }

    /// Collapses `headers` into a single mapping; later entries win on collision
    pub fn merged_headers(&self) -> HashMap<String, String> {
        merge_headers(&self.headers)
    }
}

/// Folds an ordered sequence of header mappings into one, later entries overriding earlier ones.
///
/// Names are compared case-insensitively and come out lowercased, so `Authorization` in one
/// mapping is replaced by `authorization` in a later one.
pub fn merge_headers(headers: &[HashMap<String, String>]) -> HashMap<String, String> {
    headers
        .iter()
        .fold(HashMap::new(), |mut merged, next| {
            merged.extend(
                next.iter()
                    .map(|(name, value)| (name.to_ascii_lowercase(), value.clone())),
            );
            merged
        })
}

/// Converts a header mapping into a [`HeaderMap`], rejecting names or values HTTP can't carry
pub fn to_header_map(headers: &HashMap<String, String>) -> SchemaFetchResult<HeaderMap> {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |msg: String| SchemaFetchError::InvalidHeader {
            name: name.clone(),
            msg,
        };
        let header_name = HeaderName::from_str(name).map_err(|err| invalid(err.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|err| invalid(err.to_string()))?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}

/// Settings shared by every fetcher
#[derive(Clone, Debug, Default, Getters)]
pub struct FetchConfig {
    http: HttpServiceConfig,
    registry_endpoint: Option<Url>,
    client_version: Option<String>,
}

#[buildstructor]
impl FetchConfig {
    #[builder]
    pub fn new(
        http: Option<HttpServiceConfig>,
        registry_endpoint: Option<Url>,
        client_version: Option<String>,
    ) -> FetchConfig {
        FetchConfig {
            http: http.unwrap_or_default(),
            registry_endpoint,
            client_version,
        }
    }

    /// The registry to query, falling back to [`DEFAULT_REGISTRY_ENDPOINT`]
    pub fn registry_url(&self) -> SchemaFetchResult<Url> {
        match &self.registry_endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Url::parse(DEFAULT_REGISTRY_ENDPOINT).map_err(|source| {
                SchemaFetchError::InvalidUrl {
                    url: DEFAULT_REGISTRY_ENDPOINT.to_string(),
                    source,
                }
            }),
        }
    }

    /// The version reported to the registry, defaulting to this crate's
    pub fn client_version_or_default(&self) -> &str {
        self.client_version
            .as_deref()
            .unwrap_or(env!("CARGO_PKG_VERSION"))
    }
}
