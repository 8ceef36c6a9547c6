use std::fmt;

use camino::Utf8PathBuf;
use http::StatusCode;
use schema_fetch_http::HttpServiceError;
use thiserror::Error;

use crate::format::SUPPORTED_EXTENSIONS;

/// A specialized `Result` type for fetching schemas
pub type SchemaFetchResult<T> = std::result::Result<T, SchemaFetchError>;

/// SchemaFetchError represents every way obtaining a schema can fail.
///
/// Nothing is retried: each variant reaches the caller exactly as it occurred.
#[derive(Error, Debug)]
pub enum SchemaFetchError {
    /// The endpoint configuration had no `url`.
    #[error("No endpoint provided when fetching schema")]
    NoEndpoint,

    /// The schema file is missing or could not be read.
    #[error("Unable to read file {file}. {source}")]
    ReadFile {
        file: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The schema file was read, but its contents could not be turned into a schema.
    #[error("Unable to read file {file}. {source}")]
    ParseSchema { file: Utf8PathBuf, source: ParseError },

    /// The schema file's extension does not name a format we can load.
    #[error(
        "Unable to read file {file}. Unsupported schema file extension, expected one of: {}",
        SUPPORTED_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect::<Vec<_>>().join(", ")
    )]
    UnsupportedFormat { file: Utf8PathBuf },

    /// Introspecting a schema built from a local file reported errors.
    #[error("Unable to read file {file}. {errors}")]
    LocalExecution {
        file: Utf8PathBuf,
        errors: GraphQLErrors,
    },

    /// The endpoint answered the introspection query with errors.
    #[error("{errors}")]
    RemoteExecution { errors: GraphQLErrors },

    /// The endpoint answered without errors, but also without a `__schema`.
    #[error("The introspection response from {url} did not contain a schema")]
    MissingSchema { url: String },

    /// The endpoint answered with something that is not a GraphQL response.
    #[error("Could not parse the response from {url} (status {status}): {source}")]
    InvalidResponse {
        url: String,
        status: StatusCode,
        source: serde_json::Error,
    },

    /// The registry did not return a schema for the API key's service.
    #[error("Unable to get schema from registry")]
    Registry,

    /// The API key does not carry a service identifier.
    #[error("The API key provided is malformed, expected a key of the form \"service:<id>:<secret>\"")]
    InvalidApiKey,

    /// The endpoint is neither an existing file nor a valid URL.
    #[error("\"{url}\" is not an existing file or a valid URL: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// A configured header could not be sent.
    #[error("Invalid header \"{name}\": {msg}")]
    InvalidHeader { name: String, msg: String },

    /// The HTTP client could not be constructed from the configuration.
    #[error("Could not build the HTTP client: {0}")]
    BuildClient(#[source] HttpServiceError),

    /// The request could not be sent, or no response was received.
    #[error("Could not reach {url}: {source}")]
    Http {
        url: String,
        source: HttpServiceError,
    },
}

/// Why the contents of a schema file could not be used
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file is not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The SDL does not describe a valid schema.
    #[error("{0}")]
    Sdl(String),

    /// No GraphQL document could be found in a source file.
    #[error("{0}")]
    Extract(String),
}

/// The messages of a GraphQL `errors` list, displayed one per line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphQLErrors(Vec<String>);

impl GraphQLErrors {
    /// The individual messages, in the order they were reported
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for GraphQLErrors {
    fn from(messages: Vec<String>) -> Self {
        GraphQLErrors(messages)
    }
}

impl From<&[graphql_client::Error]> for GraphQLErrors {
    fn from(errors: &[graphql_client::Error]) -> Self {
        GraphQLErrors(schema_fetch_graphql::error_messages(errors))
    }
}

impl fmt::Display for GraphQLErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}
