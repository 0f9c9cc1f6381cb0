//! # JSON Config Flatten
//!
//! Turns a JSON settings document into the flat, hierarchical key-value form
//! used by layered configuration systems.
//!
//! ## Overview
//!
//! Configuration frameworks that merge several sources (files, environment,
//! command line) usually work on flat maps where a key such as
//! `Logging:LogLevel:Default` addresses one setting. This crate produces such a
//! map from an arbitrary JSON document:
//!
//! - object properties and array indices become `:`-separated path segments
//! - every primitive leaf becomes one entry, rendered as a locale-independent string
//! - keys compare case-insensitively and the result is sorted the same way
//! - two leaves that compose the same key (in any letter case) are an error,
//!   never a silent overwrite
//!
//! ## Quick Start
//!
//! ```rust
//! use json_config::parse_str;
//!
//! let json = r#"{
//!     "Logging": { "LogLevel": { "Default": "Warning" } },
//!     "AllowedHosts": ["example.com", "api.example.com"],
//!     "Kestrel": { "Port": 8080, "Proxy": null }
//! }"#;
//!
//! let config = parse_str(json)?;
//! assert_eq!(config.get_str("logging:loglevel:default"), Some("Warning"));
//! assert_eq!(config.get_str("AllowedHosts:1"), Some("api.example.com"));
//! assert_eq!(config.get_str("Kestrel:Port"), Some("8080"));
//!
//! // null is kept as a marker, distinct from an empty string
//! assert_eq!(config.get("Kestrel:Proxy"), Some(None));
//! # Ok::<(), json_config::JsonConfigError>(())
//! ```
//!
//! ## Duplicate Keys
//!
//! ```rust
//! use json_config::{parse_str, FormatError, JsonConfigError};
//!
//! let result = parse_str(r#"{"Port": 80, "port": 443}"#);
//! match result {
//!     Err(JsonConfigError::Format(FormatError::DuplicateKey { key })) => {
//!         assert_eq!(key, "port");
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use json_config::{FlattenConfig, JsonConfigParser, RootPrimitivePolicy};
//!
//! let parser = JsonConfigParser::with_config(
//!     FlattenConfig::new()
//!         .with_max_depth(16)
//!         .with_root_primitive(RootPrimitivePolicy::Reject),
//! );
//!
//! assert!(parser.parse_str(r#""just a string""#).is_err());
//! assert_eq!(parser.parse_str(r#"{"a": [true]}"#)?.get_str("a:0"), Some("true"));
//! # Ok::<(), json_config::JsonConfigError>(())
//! ```
//!
//! ## Parse Once, Use Twice
//!
//! ```rust
//! use json_config::{flatten, load_document, to_canonical_string};
//!
//! let document = load_document(br#"{ "name" : "api", "replicas" : 3 }"#)?;
//! let config = flatten(&document)?;
//! let canonical = to_canonical_string(&document)?;
//!
//! assert_eq!(config.len(), 2);
//! assert_eq!(canonical, r#"{"name":"api","replicas":3}"#);
//! # Ok::<(), json_config::JsonConfigError>(())
//! ```
//!
//! ## Error Handling
//!
//! Syntax errors carry the line and column reported by the JSON parser:
//!
//! ```rust
//! use json_config::{parse_str, JsonConfigError};
//!
//! let source = "{\n  \"port\": 80,\n  \"host\": \n}";
//! let err = parse_str(source).unwrap_err();
//! assert!(matches!(err, JsonConfigError::MalformedDocument { .. }));
//!
//! let position = err.position().unwrap();
//! assert_eq!(position.line, 4);
//! println!("{}", err.render(source));
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` per document, `trace` per
//! entry) and never installs a subscriber.

pub mod canonical;
pub mod document;
pub mod error;
pub mod parser;
pub mod path;
pub mod store;


// Re-export main types and functions
pub use canonical::{
    canonicalize_slice, canonicalize_str, to_canonical_string, to_canonical_string_with_config,
    to_canonical_writer,
};
pub use document::{JsonArray, JsonNode, JsonObject, JsonPrimitive, NodeKind};
pub use error::{ErrorContext, FormatError, JsonConfigError, Position, Result};
pub use parser::{
    DocumentVisitor, FlattenConfig, JsonConfigParser, RootPrimitivePolicy, flatten, load_document,
    parse_reader, parse_slice, parse_str, parse_to_string,
};
pub use path::{KEY_DELIMITER, PathContext, combine, parent_path, section_key};
pub use store::{ConfigKey, FlatConfig, FlatStore};
