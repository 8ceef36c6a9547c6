use camino::Utf8Path;
use url::Url;

use crate::{
    EndpointConfig, FetchConfig, IntrospectionSchema, RemoteIntrospector, SchemaFetchError,
    SchemaFetchResult, config::to_header_map, from_file, remote::IntrospectEndpoint,
};

/// Obtains a schema from whatever an [`EndpointConfig`] points at
#[derive(Clone)]
pub struct SchemaResolver<I = RemoteIntrospector> {
    introspector: I,
}

impl SchemaResolver<RemoteIntrospector> {
    /// Builds a resolver that introspects endpoints over [`reqwest`]
    pub fn from_config(config: &FetchConfig) -> SchemaFetchResult<SchemaResolver> {
        Ok(SchemaResolver::new(RemoteIntrospector::from_config(config)?))
    }
}

impl<I: IntrospectEndpoint> SchemaResolver<I> {
    pub const fn new(introspector: I) -> SchemaResolver<I> {
        SchemaResolver { introspector }
    }

    /// Resolves `endpoint` into a schema.
    ///
    /// A `url` naming an existing file is loaded with [`from_file`] and never touches the
    /// network. Anything else must parse as a URL, which is introspected with the
    /// endpoint's headers merged in order.
    pub async fn fetch_schema(
        &self,
        endpoint: &EndpointConfig,
    ) -> SchemaFetchResult<IntrospectionSchema> {
        let url = match endpoint.url().as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(SchemaFetchError::NoEndpoint),
        };

        let path = Utf8Path::new(url);
        if path.exists() {
            tracing::debug!(%path, "endpoint is a local file");
            return from_file(path);
        }

        let parsed = Url::parse(url).map_err(|source| SchemaFetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let headers = to_header_map(&endpoint.merged_headers())?;
        tracing::debug!(url = %parsed, headers = headers.len(), "endpoint is remote");
        self.introspector.introspect_endpoint(parsed, headers).await
    }
}
