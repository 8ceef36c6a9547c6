use std::time::Duration;

use anyhow::Result;
use assert_fs::{TempDir, prelude::*};
use httpmock::{Method, MockServer};
use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use schema_fetch::{
    EndpointConfig, FetchConfig, IntrospectionSchema, RegistryClient, SchemaFetchError,
    SchemaResolver, from_file,
};
use schema_fetch_http::HttpServiceConfig;
use serde_json::{Value, json};
use speculoos::prelude::*;
use url::Url;

const API_KEY: &str = "service:my-graph:abc123";

const SDL: &str = indoc! {r#"
    type Query {
      products: [Product!]!
    }

    type Product {
      upc: ID!
      name: String
    }
"#};

#[fixture]
fn schema() -> Value {
    json!({
        "queryType": { "name": "Query" },
        "mutationType": null,
        "subscriptionType": null,
        "types": [],
        "directives": []
    })
}

fn init_logging() {
    timber::init(Some(timber::Level::DEBUG));
}

fn registry_config(server: &MockServer) -> FetchConfig {
    FetchConfig::builder()
        .registry_endpoint(Url::parse(&server.url("/api/graphql")).unwrap())
        .client_version("0.0.1-test")
        .http(
            HttpServiceConfig::builder()
                .timeout(Duration::from_secs(5))
                .build(),
        )
        .build()
}

#[rstest]
#[tokio::test]
async fn introspects_a_live_endpoint_with_merged_headers(schema: Value) -> Result<()> {
    init_logging();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/graphql")
                .header("content-type", "application/json")
                .header("a", "2")
                .header("b", "3")
                .json_body_includes(r#"{ "operationName": "IntrospectionQuery" }"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "data": { "__schema": schema.clone() } }));
        })
        .await;

    let resolver = SchemaResolver::from_config(&FetchConfig::default())?;
    let endpoint: EndpointConfig = serde_json::from_value(json!({
        "url": server.url("/graphql"),
        "headers": [{ "a": "1" }, { "a": "2", "b": "3" }]
    }))?;

    let fetched = resolver.fetch_schema(&endpoint).await?;

    mock.assert_async().await;
    assert_eq!(fetched, IntrospectionSchema::new(schema));
    Ok(())
}

#[tokio::test]
async fn surfaces_every_remote_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/graphql");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": null,
                    "errors": [
                        { "message": "introspection is disabled" },
                        { "message": "ask an administrator" }
                    ]
                }));
        })
        .await;

    let resolver = SchemaResolver::from_config(&FetchConfig::default())?;
    let endpoint = EndpointConfig::builder()
        .url(server.url("/graphql"))
        .build();

    let result = resolver.fetch_schema(&endpoint).await;
    assert_that!(result)
        .is_err()
        .matches(|err| err.to_string() == "introspection is disabled\nask an administrator");
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoints_are_http_errors() -> Result<()> {
    let resolver = SchemaResolver::from_config(&FetchConfig::default())?;
    let endpoint = EndpointConfig::builder()
        .url("http://127.0.0.1:1/graphql")
        .build();

    let result = resolver.fetch_schema(&endpoint).await;
    assert_that!(result).is_err().matches(|err| {
        matches!(err, SchemaFetchError::Http { source, .. } if source.is_connect())
    });
    Ok(())
}

#[rstest]
#[tokio::test]
async fn local_files_win_over_the_network(schema: Value) -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.child("schema.json");
    file.write_str(&json!({ "data": { "__schema": schema.clone() } }).to_string())?;

    let resolver = SchemaResolver::from_config(&FetchConfig::default())?;
    let endpoint = EndpointConfig::builder()
        .url(file.path().to_string_lossy())
        .build();

    let fetched = resolver.fetch_schema(&endpoint).await?;
    assert_eq!(fetched, IntrospectionSchema::new(schema));
    Ok(())
}

#[test]
fn sdl_and_embedded_sdl_introspect_identically() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let sdl_file = temp_dir.child("products.graphql");
    sdl_file.write_str(SDL)?;
    let ts_file = temp_dir.child("products.ts");
    ts_file.write_str(&format!(
        "import {{ gql }} from \"graphql-tag\";\n\nexport const typeDefs = gql`\n{SDL}`;\n"
    ))?;

    let sdl_path = camino::Utf8PathBuf::try_from(sdl_file.path().to_path_buf())?;
    let ts_path = camino::Utf8PathBuf::try_from(ts_file.path().to_path_buf())?;

    let from_sdl = from_file(&sdl_path)?;
    assert_eq!(from_file(&sdl_path)?, from_sdl);
    assert_eq!(from_file(&ts_path)?, from_sdl);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn fetches_the_current_schema_from_the_registry(schema: Value) -> Result<()> {
    init_logging();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/graphql")
                .header("x-api-key", API_KEY)
                .header("apollographql-client-name", "schema-fetch")
                .header("apollographql-client-version", "0.0.1-test")
                .json_body_includes(
                    json!({
                        "operationName": "GetSchemaByTag",
                        "variables": { "id": "my-graph", "tag": "current" }
                    })
                    .to_string(),
                );
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "service": {
                            "schema": { "hash": "123", "__schema": schema.clone() }
                        }
                    }
                }));
        })
        .await;

    let registry = RegistryClient::from_config(&registry_config(&server))?;
    let fetched = registry.fetch_schema(API_KEY).await?;

    mock.assert_async().await;
    assert_eq!(fetched, IntrospectionSchema::new(schema));
    Ok(())
}

#[rstest]
#[case::null_schema(json!({
    "data": { "service": { "schema": null } },
    "errors": [{ "message": "schema not found" }]
}))]
#[case::null_data(json!({ "data": null }))]
#[tokio::test]
async fn registry_misses_hide_upstream_errors(#[case] body: Value) -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/graphql");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body.clone());
        })
        .await;

    let registry = RegistryClient::from_config(&registry_config(&server))?;
    let result = registry.fetch_schema(API_KEY).await;

    assert_that!(result).is_err().matches(|err| {
        matches!(err, SchemaFetchError::Registry)
            && err.to_string() == "Unable to get schema from registry"
    });
    Ok(())
}
