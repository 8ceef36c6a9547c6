//! The introspection query, and executing it against schemas built from local SDL

use apollo_compiler::{ExecutableDocument, Schema, introspection, validation::Valid};
use camino::Utf8Path;
use graphql_client::{GraphQLQuery, QueryBody};
use schema_fetch_graphql::GraphQLResponse;
use serde::{Deserialize, Serialize};

use crate::{
    IntrospectionSchema, SchemaFetchError, SchemaFetchResult,
    error::{GraphQLErrors, ParseError},
};

/// The query sent to live endpoints, and executed against schemas loaded from SDL
pub const INTROSPECTION_QUERY: &str = include_str!("introspection_query.graphql");

const OPERATION_NAME: &str = "IntrospectionQuery";

/// [`GraphQLQuery`] for [`INTROSPECTION_QUERY`]
pub struct IntrospectionQuery;

/// The introspection query takes no variables
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntrospectionVariables {}

/// The `data` of an introspection response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionResponseData {
    #[serde(rename = "__schema", default)]
    pub schema: Option<IntrospectionSchema>,
}

impl GraphQLQuery for IntrospectionQuery {
    type Variables = IntrospectionVariables;
    type ResponseData = IntrospectionResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: INTROSPECTION_QUERY,
            operation_name: OPERATION_NAME,
        }
    }
}

/// Builds a schema from `sdl` and runs [`INTROSPECTION_QUERY`] against it.
///
/// `file` is only used to report where the SDL came from.
pub(crate) fn introspect_sdl(sdl: &str, file: &Utf8Path) -> SchemaFetchResult<IntrospectionSchema> {
    let execution_error = |messages: Vec<String>| SchemaFetchError::LocalExecution {
        file: file.to_path_buf(),
        errors: GraphQLErrors::from(messages),
    };

    let schema = Schema::parse_and_validate(sdl, file).map_err(|invalid| {
        SchemaFetchError::ParseSchema {
            file: file.to_path_buf(),
            source: ParseError::Sdl(invalid.errors.to_string()),
        }
    })?;
    let document =
        ExecutableDocument::parse_and_validate(&schema, INTROSPECTION_QUERY, "introspection.graphql")
            .map_err(|invalid| execution_error(vec![invalid.errors.to_string()]))?;
    let operation = document
        .operations
        .get(Some(OPERATION_NAME))
        .map_err(|_| execution_error(vec![format!("missing operation {OPERATION_NAME}")]))?;

    tracing::debug!(%file, "executing introspection query against local schema");
    let response = introspection::partial_execute(
        &schema,
        &schema.implementers_map(),
        &document,
        operation,
        Valid::assume_valid_ref(&Default::default()),
    )
    .map_err(|err| execution_error(vec![err.message().to_string()]))?;

    let response: GraphQLResponse<IntrospectionResponseData> = serde_json::to_value(&response)
        .and_then(serde_json::from_value)
        .map_err(|err| SchemaFetchError::ParseSchema {
            file: file.to_path_buf(),
            source: ParseError::Json(err),
        })?;

    match (response.data, response.errors) {
        (_, Some(errors)) if !errors.is_empty() => Err(SchemaFetchError::LocalExecution {
            file: file.to_path_buf(),
            errors: GraphQLErrors::from(errors.as_slice()),
        }),
        (Some(IntrospectionResponseData { schema: Some(schema) }), _) => Ok(schema),
        _ => Err(execution_error(vec![
            "introspection did not produce a schema".to_string(),
        ])),
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use graphql_client::GraphQLQuery;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use speculoos::prelude::*;

    use super::{IntrospectionQuery, IntrospectionVariables, introspect_sdl};
    use crate::SchemaFetchError;

    const SDL: &str = indoc! {r#"
        type Query {
          "Look up a book by its title"
          book(title: String!): Book
          books: [Book!]!
        }

        type Book {
          title: String!
          author: String @deprecated(reason: "use authors")
          authors: [String!]!
        }
    "#};

    #[test]
    fn the_request_body_names_the_operation() {
        let body = serde_json::to_value(IntrospectionQuery::build_query(IntrospectionVariables {}))
            .unwrap();
        assert_eq!(body["operationName"], json!("IntrospectionQuery"));
        assert_eq!(body["variables"], json!({}));
        assert!(
            body["query"]
                .as_str()
                .is_some_and(|query| query.starts_with("query IntrospectionQuery"))
        );
    }

    #[test]
    fn introspects_local_sdl() {
        let schema = introspect_sdl(SDL, Utf8Path::new("books.graphql")).unwrap();
        let schema = schema.as_value();

        assert_eq!(schema["queryType"], json!({ "name": "Query" }));
        assert_eq!(schema["mutationType"], json!(null));

        let types = schema["types"].as_array().unwrap();
        let book = types
            .iter()
            .find(|ty| ty["name"] == json!("Book"))
            .unwrap();
        assert_eq!(book["kind"], json!("OBJECT"));

        let author = book["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|field| field["name"] == json!("author"))
            .unwrap();
        assert_eq!(author["isDeprecated"], json!(true));
        assert_eq!(author["deprecationReason"], json!("use authors"));
    }

    #[test]
    fn introspection_is_deterministic() {
        let first = introspect_sdl(SDL, Utf8Path::new("books.graphql")).unwrap();
        let second = introspect_sdl(SDL, Utf8Path::new("other.graphql")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_sdl_is_a_parse_error() {
        let result = introspect_sdl("type Query { book: Book }", Utf8Path::new("broken.graphql"));
        assert_that!(result).is_err().matches(|err| {
            matches!(err, SchemaFetchError::ParseSchema { file, .. } if file == "broken.graphql")
                && err.to_string().starts_with("Unable to read file broken.graphql.")
        });
    }
}
