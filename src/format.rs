use camino::Utf8Path;

/// Every file extension [`SourceFormat::from_path`] recognises, grouped by format
pub const SUPPORTED_EXTENSIONS: [&str; 8] = [
    "json", "graphql", "graphqls", "gql", "ts", "tsx", "js", "jsx",
];

/// The kinds of local file a schema can be loaded from
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SourceFormat {
    /// An introspection result, in any of the shapes [`crate::schema::IntrospectionDump`] accepts
    Json,
    /// Schema Definition Language
    Sdl,
    /// JavaScript or TypeScript with the schema embedded in a `gql` template
    EmbeddedSource,
}

impl SourceFormat {
    /// Resolves the format from an extension, without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Self::Json),
            "graphql" | "graphqls" | "gql" => Some(Self::Sdl),
            "ts" | "tsx" | "js" | "jsx" => Some(Self::EmbeddedSource),
            _ => None,
        }
    }

    /// Resolves the format from the extension of `path`
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use rstest::rstest;
    use speculoos::prelude::*;

    use super::{SUPPORTED_EXTENSIONS, SourceFormat};

    #[rstest]
    #[case::json("schema.json", Some(SourceFormat::Json))]
    #[case::graphql("schema.graphql", Some(SourceFormat::Sdl))]
    #[case::graphqls("nested/dir/schema.graphqls", Some(SourceFormat::Sdl))]
    #[case::gql("schema.gql", Some(SourceFormat::Sdl))]
    #[case::ts("src/schema.ts", Some(SourceFormat::EmbeddedSource))]
    #[case::tsx("schema.tsx", Some(SourceFormat::EmbeddedSource))]
    #[case::js("schema.js", Some(SourceFormat::EmbeddedSource))]
    #[case::jsx("schema.jsx", Some(SourceFormat::EmbeddedSource))]
    #[case::yaml("schema.yaml", None)]
    #[case::uppercase("schema.JSON", None)]
    #[case::no_extension("schema", None)]
    #[case::dotfile(".graphql", None)]
    fn resolves_formats_from_paths(#[case] path: &str, #[case] expected: Option<SourceFormat>) {
        assert_that!(SourceFormat::from_path(Utf8Path::new(path))).is_equal_to(expected);
    }

    #[test]
    fn every_supported_extension_resolves() {
        for ext in SUPPORTED_EXTENSIONS {
            assert_that!(SourceFormat::from_extension(ext)).is_some();
        }
    }
}
