//! Pulls `gql` documents out of JavaScript and TypeScript sources

use lazy_static::lazy_static;
use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::error::ParseError;

/// Template tags whose contents are GraphQL
pub const GQL_TAGS: &[&str] = &["gql"];

lazy_static! {
    static ref INTERPOLATION: Regex = Regex::new(r"\$\{[^}]*\}").unwrap();
}

/// A GraphQL document found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtractedDocument {
    start_byte: usize,
    content: String,
}

/// Extracts every `gql` document from `source` and joins them, in source order, into a
/// single document.
///
/// `${...}` interpolations are dropped, so fragments spread in from other modules must be
/// defined in the same file to survive. The TSX grammar is used for every language, as it
/// accepts JavaScript and JSX as well.
pub fn extract_document(source: &str) -> Result<String, ParseError> {
    let mut documents = extract_documents(source, GQL_TAGS)?;
    documents.sort_by_key(|doc| doc.start_byte);
    let document = documents
        .into_iter()
        .map(|doc| doc.content)
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if document.is_empty() {
        Err(ParseError::Extract(
            "no gql document found in source".to_string(),
        ))
    } else {
        Ok(document)
    }
}

fn extract_documents(
    source: &str,
    allowed_tags: &[&str],
) -> Result<Vec<ExtractedDocument>, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
        .map_err(|err| ParseError::Extract(err.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Extract("could not parse source".to_string()))?;

    let mut documents = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
        let tag = match node.kind() {
            "tagged_template" | "tagged_template_expression" => node.child(0),
            "call_expression" => node
                .child_by_field_name("function")
                .or_else(|| node.child(0)),
            _ => None,
        };
        if let Some(doc) = tag.and_then(|tag| extract_template(source, &node, &tag, allowed_tags))
        {
            documents.push(doc);
        }
    }
    Ok(documents)
}

fn extract_template(
    source: &str,
    node: &Node<'_>,
    tag: &Node<'_>,
    allowed_tags: &[&str],
) -> Option<ExtractedDocument> {
    let tag_text = tag.utf8_text(source.as_bytes()).ok()?;
    if !allowed_tags.contains(&tag_text.trim()) {
        return None;
    }
    let template = find_child(node, "template_string").or_else(|| {
        // `gql(`...`)` nests the template inside the call's arguments
        let arguments = node.child_by_field_name("arguments")?;
        find_child(&arguments, "template_string")
    })?;
    let template_text = template.utf8_text(source.as_bytes()).ok()?;
    let content = INTERPOLATION
        .replace_all(template_text.trim_matches('`'), "")
        .trim()
        .to_string();
    Some(ExtractedDocument {
        start_byte: template.start_byte(),
        content,
    })
}

fn find_child<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}
