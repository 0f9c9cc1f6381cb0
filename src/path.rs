//! Hierarchical configuration key paths
//!
//! Keys are segments joined by [`KEY_DELIMITER`]. Object property names and
//! stringified array indices are both plain segments, so `servers:0:host`
//! addresses the `host` property of the first element of `servers`.

use smallvec::SmallVec;

/// Separator between the segments of a configuration key
pub const KEY_DELIMITER: &str = ":";

/// Joins segments into a configuration key, root first
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            path.push_str(KEY_DELIMITER);
        }
        path.push_str(segment.as_ref());
    }
    path
}

/// Returns the last segment of a key (`"a:b:c"` -> `"c"`)
pub fn section_key(path: &str) -> &str {
    match path.rfind(KEY_DELIMITER) {
        Some(index) => &path[index + KEY_DELIMITER.len()..],
        None => path,
    }
}

/// Returns the key of the enclosing section, or `None` for a top-level key
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind(KEY_DELIMITER).map(|index| &path[..index])
}

/// Current position of a depth-first traversal, as a stack of segments.
///
/// The composed path is cached and kept up to date by [`enter`](Self::enter)
/// and [`exit`](Self::exit), so [`current_path`](Self::current_path) is free.
#[derive(Debug, Clone, Default)]
pub struct PathContext {
    /// Segments from root to leaf
    segments: SmallVec<[String; 8]>,
    /// Length of the composed path before each segment was entered
    boundaries: SmallVec<[usize; 8]>,
    /// Cached composed path
    current: String,
}

impl PathContext {
    /// Creates an empty context positioned at the root
    pub fn new() -> Self {
        Self::default()
    }

    /// Descends into `segment`
    pub fn enter(&mut self, segment: impl Into<String>) {
        let segment = segment.into();
        self.boundaries.push(self.current.len());
        if !self.segments.is_empty() {
            self.current.push_str(KEY_DELIMITER);
        }
        self.current.push_str(&segment);
        self.segments.push(segment);
    }

    /// Leaves the most recently entered segment
    pub fn exit(&mut self) {
        debug_assert!(
            !self.segments.is_empty(),
            "PathContext::exit called at the root"
        );
        if self.segments.pop().is_some()
            && let Some(boundary) = self.boundaries.pop()
        {
            self.current.truncate(boundary);
        }
    }

    /// The composed path of the current position; empty at the root
    pub fn current_path(&self) -> &str {
        &self.current
    }

    /// Segments from root to the current position
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments entered
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns true when no segment is entered
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}
