//! Error types and source positions for JSON configuration parsing
//!
//! Every failure is fatal to the single parse operation that raised it: the
//! caller receives an error and never a partially populated result.

use crate::document::NodeKind;
use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Creates a position at the given line and column
    pub fn at(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source text plus the location of an error, for rendering diagnostics
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The original source text
    pub source: String,
    /// Where the error occurred
    pub position: Position,
    /// Additional help text
    pub help: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context
    pub fn new(source: impl Into<String>, position: Position) -> Self {
        Self {
            source: source.into(),
            position,
            help: None,
        }
    }

    /// Adds help text for the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Extracts the source code snippet around the error
    pub fn source_snippet(&self) -> String {
        self.extract_lines_around(2)
    }

    /// Extracts lines around the error position with context
    pub fn extract_lines_around(&self, context_lines: usize) -> String {
        let lines: Vec<&str> = self.source.lines().collect();
        if lines.is_empty() {
            return String::new();
        }

        // serde_json reports EOF errors one line past the last one
        let error_line = self.position.line.clamp(1, lines.len());
        let context_start = (error_line - 1).saturating_sub(context_lines);
        let context_end = (error_line + context_lines).min(lines.len());
        let line_number_width = context_end.to_string().len();

        let mut result = String::new();
        for (i, line) in lines[context_start..context_end].iter().enumerate() {
            let line_num = context_start + i + 1;
            result.push_str(&format!(
                "{:width$} | {}\n",
                line_num,
                line,
                width = line_number_width
            ));

            if line_num == error_line {
                let spaces =
                    " ".repeat(line_number_width + 3 + self.position.column.saturating_sub(1));
                result.push_str(&format!("{}^  <-- Error here\n", spaces));
            }
        }

        result
    }

    /// Formats the error context for display
    pub fn format_error(&self, error_message: &str) -> String {
        let mut output = format!("Error at {}: {}\n\n", self.position, error_message);
        output.push_str(&self.source_snippet());

        if let Some(help) = &self.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Main error type for JSON configuration parsing operations
#[derive(Debug, Error)]
pub enum JsonConfigError {
    /// The document could not be flattened
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// The input is not a valid JSON document
    #[error("Malformed JSON document at {position}: {message}")]
    MalformedDocument { message: String, position: Position },

    /// A document tree could not be written back out as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonConfigError {
    /// Returns the source location of the error when the parser reported one
    pub fn position(&self) -> Option<Position> {
        match self {
            JsonConfigError::MalformedDocument { position, .. } => Some(*position),
            JsonConfigError::Format(FormatError::UnsupportedToken { position, .. }) => *position,
            _ => None,
        }
    }

    /// Renders the error together with a snippet of `source` when a location is known
    pub fn render(&self, source: &str) -> String {
        match self.position() {
            Some(position) => {
                let mut context = ErrorContext::new(source, position);
                if let JsonConfigError::Format(FormatError::UnsupportedToken { .. }) = self {
                    context = context.with_help(
                        "Only objects, arrays, strings, numbers, booleans and null can be flattened",
                    );
                }
                context.format_error(&self.to_string())
            }
            None => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for JsonConfigError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return JsonConfigError::Io(err.into());
        }

        let position = Position::at(err.line(), err.column());
        let full = err.to_string();
        let suffix = format!(" at line {} column {}", err.line(), err.column());
        let message = match full.strip_suffix(&suffix) {
            Some(message) => message.to_string(),
            None => full,
        };

        JsonConfigError::MalformedDocument { message, position }
    }
}

/// Errors raised while flattening a parsed document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The tree holds a node kind with no flattened representation
    #[error(
        "Unsupported JSON token '{kind}' was found. Path '{path}'{}.",
        describe_location(.position)
    )]
    UnsupportedToken {
        kind: NodeKind,
        path: String,
        position: Option<Position>,
    },

    /// Two leaves composed the same key, compared case-insensitively
    #[error("A duplicate key '{key}' was found.")]
    DuplicateKey { key: String },

    /// Nesting depth guard tripped
    #[error("Maximum nesting depth of {max_depth} exceeded at path '{path}'")]
    MaxDepthExceeded { path: String, max_depth: usize },

    /// The document root is a bare primitive and the policy forbids it
    #[error("Root-level {kind} value is not allowed: the document must be an object or an array")]
    RootPrimitive { kind: NodeKind },
}

fn describe_location(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(", line {} position {}", position.line, position.column),
        None => String::new(),
    }
}

/// Result type for JSON configuration operations
pub type Result<T> = std::result::Result<T, JsonConfigError>;
