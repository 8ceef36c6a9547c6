use std::fs;

use camino::Utf8Path;

use crate::{
    IntrospectionSchema, SchemaFetchError, SchemaFetchResult, error::ParseError,
    extract::extract_document, format::SourceFormat, introspection::introspect_sdl,
    schema::IntrospectionDump,
};

/// Loads a schema from a file on disk, picking how to read it from the file's extension.
///
/// * `.json` files hold an introspection result, either as a full response
///   (`{ "data": { "__schema": ... } }`), as `{ "__schema": ... }`, or as the schema itself.
/// * `.graphql`, `.graphqls` and `.gql` files hold SDL, which is built into a schema and
///   introspected locally.
/// * `.ts`, `.tsx`, `.js` and `.jsx` files embed SDL in `gql` templates.
///
/// Every failure is reported as `Unable to read file <file>. <reason>`.
pub fn from_file<P>(file: P) -> SchemaFetchResult<IntrospectionSchema>
where
    P: AsRef<Utf8Path>,
{
    let file = file.as_ref();
    tracing::info!("reading {} from disk", file);
    let contents = fs::read_to_string(file).map_err(|source| SchemaFetchError::ReadFile {
        file: file.to_path_buf(),
        source,
    })?;
    let Some(format) = SourceFormat::from_path(file) else {
        return Err(SchemaFetchError::UnsupportedFormat {
            file: file.to_path_buf(),
        });
    };
    let parse_error = |source: ParseError| SchemaFetchError::ParseSchema {
        file: file.to_path_buf(),
        source,
    };

    tracing::debug!(?format, %file, "loading schema");
    match format {
        SourceFormat::Json => serde_json::from_str::<IntrospectionDump>(&contents)
            .map(IntrospectionSchema::from)
            .map_err(|err| parse_error(ParseError::Json(err))),
        SourceFormat::Sdl => introspect_sdl(&contents, file),
        SourceFormat::EmbeddedSource => {
            let sdl = extract_document(&contents).map_err(parse_error)?;
            introspect_sdl(&sdl, file)
        }
    }
}
