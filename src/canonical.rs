//! Compact re-serialization of parsed documents
//!
//! Callers that cache or hash a configuration file rather than flatten it
//! reuse the parsed tree and write it back without insignificant whitespace.
//! Property order is the source order.

use crate::document::JsonNode;
use crate::error::{FormatError, JsonConfigError};
use crate::parser::{self, FlattenConfig};
use crate::path::PathContext;
use std::io::Write;

/// Serializes a document tree as compact JSON with the default configuration
pub fn to_canonical_string(document: &JsonNode) -> Result<String, JsonConfigError> {
    to_canonical_string_with_config(document, &FlattenConfig::default())
}

/// Serializes a document tree as compact JSON, nested no deeper than
/// `config.max_depth`
pub fn to_canonical_string_with_config(
    document: &JsonNode,
    config: &FlattenConfig,
) -> Result<String, JsonConfigError> {
    ensure_serializable(document, &mut PathContext::new(), config.max_depth)?;
    serde_json::to_string(document).map_err(JsonConfigError::Serialization)
}

/// Writes a document tree as compact JSON
pub fn to_canonical_writer<W: Write>(
    document: &JsonNode,
    writer: W,
) -> Result<(), JsonConfigError> {
    let max_depth = FlattenConfig::default().max_depth;
    ensure_serializable(document, &mut PathContext::new(), max_depth)?;
    serde_json::to_writer(writer, document).map_err(JsonConfigError::Serialization)
}

/// Parses a JSON string and returns its compact form
pub fn canonicalize_str(input: &str) -> Result<String, JsonConfigError> {
    canonicalize_slice(input.as_bytes())
}

/// Parses JSON bytes and returns their compact form
pub fn canonicalize_slice(input: &[u8]) -> Result<String, JsonConfigError> {
    let document = parser::load_document(input)?;
    to_canonical_string(&document)
}

fn ensure_serializable(
    node: &JsonNode,
    context: &mut PathContext,
    max_depth: usize,
) -> Result<(), FormatError> {
    match node {
        JsonNode::Object(object) => {
            for (name, value) in object {
                enter(context, name.as_str(), max_depth)?;
                ensure_serializable(value, context, max_depth)?;
                context.exit();
            }
            Ok(())
        }
        JsonNode::Array(array) => {
            for (index, element) in array.iter().enumerate() {
                enter(context, index.to_string(), max_depth)?;
                ensure_serializable(element, context, max_depth)?;
                context.exit();
            }
            Ok(())
        }
        JsonNode::Primitive(_) => Ok(()),
        unsupported => Err(FormatError::UnsupportedToken {
            kind: unsupported.kind(),
            path: context.current_path().to_string(),
            position: unsupported.position(),
        }),
    }
}

fn enter(
    context: &mut PathContext,
    segment: impl Into<String>,
    max_depth: usize,
) -> Result<(), FormatError> {
    if context.depth() >= max_depth {
        return Err(FormatError::MaxDepthExceeded {
            path: context.current_path().to_string(),
            max_depth,
        });
    }
    context.enter(segment);
    Ok(())
}
