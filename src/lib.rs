//! Obtains GraphQL schemas, as introspection results, from local files, live
//! endpoints and the schema registry.

/// Module for configuring where schemas come from and how they are fetched.
pub mod config;
mod error;
/// Module for pulling GraphQL documents out of JavaScript and TypeScript.
pub mod extract;
mod format;
/// Module for the introspection query and running it locally.
pub mod introspection;
mod local;
/// Module for fetching schemas from the registry.
pub mod registry;
mod remote;
mod resolver;
mod schema;

pub use config::{DEFAULT_REGISTRY_ENDPOINT, EndpointConfig, FetchConfig, merge_headers};
pub use error::{GraphQLErrors, ParseError, SchemaFetchError, SchemaFetchResult};
pub use format::{SUPPORTED_EXTENSIONS, SourceFormat};
pub use introspection::INTROSPECTION_QUERY;
pub use local::from_file;
pub use registry::RegistryClient;
pub use remote::{IntrospectEndpoint, RemoteIntrospector};
pub use resolver::SchemaResolver;
pub use schema::IntrospectionSchema;
