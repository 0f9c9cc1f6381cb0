//! JSON configuration parser
//!
//! This module turns a JSON document into a [`FlatConfig`]: the document is
//! parsed into a [`JsonNode`] tree, which [`DocumentVisitor`] walks depth-first
//! while recording one entry per primitive leaf under its composed path.

use crate::canonical;
use crate::document::{JsonArray, JsonNode, JsonObject, JsonPrimitive};
use crate::error::{FormatError, JsonConfigError};
use crate::path::PathContext;
use crate::store::{FlatConfig, FlatStore};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, debug_span, trace};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What to do when the whole document is a single primitive value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPrimitivePolicy {
    /// Record the value under the empty key
    #[default]
    Allow,
    /// Fail with [`FormatError::RootPrimitive`]
    Reject,
}

/// Configuration options for flattening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Maximum nesting depth to prevent stack overflow
    pub max_depth: usize,
    /// Handling of a document that is a bare primitive
    pub root_primitive: RootPrimitivePolicy,
}

impl FlattenConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the root primitive policy
    pub fn with_root_primitive(mut self, policy: RootPrimitivePolicy) -> Self {
        self.root_primitive = policy;
        self
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            root_primitive: RootPrimitivePolicy::Allow,
        }
    }
}

/// Depth-first walk of one document, owning the path stack and result store
/// for that single traversal.
pub struct DocumentVisitor<'c> {
    config: &'c FlattenConfig,
    context: PathContext,
    store: FlatStore,
}

impl<'c> DocumentVisitor<'c> {
    /// Creates a visitor with an empty path and an empty store
    pub fn new(config: &'c FlattenConfig) -> Self {
        Self {
            config,
            context: PathContext::new(),
            store: FlatStore::new(),
        }
    }

    /// Walks `root` and returns the finished result
    pub fn visit_document(mut self, root: &JsonNode) -> Result<FlatConfig, FormatError> {
        if let JsonNode::Primitive(primitive) = root
            && self.config.root_primitive == RootPrimitivePolicy::Reject
        {
            return Err(FormatError::RootPrimitive {
                kind: primitive.kind(),
            });
        }

        self.visit_value(root)?;
        debug_assert!(self.context.is_root(), "unbalanced path context");
        Ok(self.store.finalize())
    }

    fn visit_value(&mut self, node: &JsonNode) -> Result<(), FormatError> {
        match node {
            JsonNode::Object(object) => self.visit_object(object),
            JsonNode::Array(array) => self.visit_array(array),
            JsonNode::Primitive(primitive) => self.visit_primitive(primitive),
            unsupported => Err(FormatError::UnsupportedToken {
                kind: unsupported.kind(),
                path: self.context.current_path().to_string(),
                position: unsupported.position(),
            }),
        }
    }

    fn visit_object(&mut self, object: &JsonObject) -> Result<(), FormatError> {
        for (name, value) in object {
            self.enter(name.as_str())?;
            self.visit_value(value)?;
            self.context.exit();
        }
        Ok(())
    }

    fn visit_array(&mut self, array: &JsonArray) -> Result<(), FormatError> {
        for (index, element) in array.iter().enumerate() {
            self.enter(index.to_string())?;
            self.visit_value(element)?;
            self.context.exit();
        }
        Ok(())
    }

    fn visit_primitive(&mut self, primitive: &JsonPrimitive) -> Result<(), FormatError> {
        let key = self.context.current_path();
        let value = primitive.to_config_value();
        trace!(key, value = value.as_deref(), "flattened entry");
        self.store.insert(key, value)
    }

    fn enter(&mut self, segment: impl Into<String>) -> Result<(), FormatError> {
        if self.context.depth() >= self.config.max_depth {
            return Err(FormatError::MaxDepthExceeded {
                path: self.context.current_path().to_string(),
                max_depth: self.config.max_depth,
            });
        }
        self.context.enter(segment);
        Ok(())
    }
}

/// Parses JSON documents into flattened configuration data.
///
/// The parser holds only its configuration; every call builds a fresh path
/// context and store, so one parser can serve any number of documents.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigParser {
    config: FlattenConfig,
}

impl JsonConfigParser {
    /// Creates a parser with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given configuration
    pub fn with_config(config: FlattenConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration
    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Parses JSON bytes into a document tree without flattening it.
    ///
    /// A leading UTF-8 byte order mark is skipped. A property name repeated
    /// inside one object fails with [`FormatError::DuplicateKey`].
    pub fn load_document(&self, input: &[u8]) -> Result<JsonNode, JsonConfigError> {
        let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        JsonNode::from_slice(input)
    }

    /// Reads `reader` to the end and parses it into a document tree.
    ///
    /// The reader is left at its end; it is never rewound.
    pub fn load_document_from_reader<R: Read>(
        &self,
        mut reader: R,
    ) -> Result<JsonNode, JsonConfigError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        self.load_document(&buffer)
    }

    /// Flattens an already parsed document
    pub fn flatten(&self, document: &JsonNode) -> Result<FlatConfig, JsonConfigError> {
        let _span = debug_span!("flatten", max_depth = self.config.max_depth).entered();

        let config = DocumentVisitor::new(&self.config).visit_document(document)?;
        debug!(entries = config.len(), "flattened JSON document");
        Ok(config)
    }

    /// Parses and flattens a JSON string
    pub fn parse_str(&self, input: &str) -> Result<FlatConfig, JsonConfigError> {
        self.parse_slice(input.as_bytes())
    }

    /// Parses and flattens JSON bytes
    pub fn parse_slice(&self, input: &[u8]) -> Result<FlatConfig, JsonConfigError> {
        debug!(bytes = input.len(), "parsing JSON configuration");
        let document = self.load_document(input)?;
        self.flatten(&document)
    }

    /// Parses and flattens the full contents of a reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<FlatConfig, JsonConfigError> {
        let document = self.load_document_from_reader(reader)?;
        self.flatten(&document)
    }

    /// Reads a JSON document and returns it re-serialized in compact form
    pub fn parse_to_string<R: Read>(&self, reader: R) -> Result<String, JsonConfigError> {
        let document = self.load_document_from_reader(reader)?;
        canonical::to_canonical_string_with_config(&document, &self.config)
    }
}

/// Parses and flattens a JSON string with the default configuration
pub fn parse_str(input: &str) -> Result<FlatConfig, JsonConfigError> {
    JsonConfigParser::new().parse_str(input)
}

/// Parses and flattens JSON bytes with the default configuration
pub fn parse_slice(input: &[u8]) -> Result<FlatConfig, JsonConfigError> {
    JsonConfigParser::new().parse_slice(input)
}

/// Parses and flattens the contents of a reader with the default configuration
pub fn parse_reader<R: Read>(reader: R) -> Result<FlatConfig, JsonConfigError> {
    JsonConfigParser::new().parse_reader(reader)
}

/// Reads a JSON document and returns its compact canonical form
pub fn parse_to_string<R: Read>(reader: R) -> Result<String, JsonConfigError> {
    JsonConfigParser::new().parse_to_string(reader)
}

/// Parses JSON bytes into a document tree
pub fn load_document(input: &[u8]) -> Result<JsonNode, JsonConfigError> {
    JsonConfigParser::new().load_document(input)
}

/// Flattens a parsed document with the default configuration
pub fn flatten(document: &JsonNode) -> Result<FlatConfig, JsonConfigError> {
    JsonConfigParser::new().flatten(document)
}
