//! Asset data path parsing and validation.
//!
//! Paths come in two conventions:
//! - Relative, dot-separated: "test1.resourceInt"
//! - Absolute, slash-separated: "/test2/resourceInt"
//!
//! Both `.` and `/` separate segments in the path body, so "a/b.c" and
//! "/a/b/c" name the same resource. The convention only records whether the
//! caller wrote a leading `/`. Every segment must be non-empty after trimming
//! whitespace, and a path may neither start (after the optional leading `/`)
//! nor end with a separator.

use serde::{Deserialize, Serialize};

/// Default upper bound on the raw path length, in bytes.
pub const DEFAULT_MAX_PATH_BYTES: usize = 511;

/// Which delimiter convention a path was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Relative path without a leading delimiter: "a.b.c"
    Dot,
    /// Absolute path with a leading '/': "/a/b/c"
    Slash,
}

/// A parsed, validated asset data path.
///
/// Equality and hashing only consider the segments: "a.b" and "/a/b" are the
/// same resource.
#[derive(Debug, Clone)]
pub struct ResourcePath {
    /// The original path string
    raw: String,
    /// Convention the raw string was written in
    delimiter: Delimiter,
    /// Non-empty segments
    segments: Vec<String>,
}

fn is_separator(c: char) -> bool {
    c == '.' || c == '/'
}

impl ResourcePath {
    /// Parse a path using the default length bound.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        Self::parse_bounded(path, DEFAULT_MAX_PATH_BYTES)
    }

    /// Parse a path, rejecting raw strings longer than `max_bytes`.
    pub fn parse_bounded(path: &str, max_bytes: usize) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        if path.len() > max_bytes {
            return Err(PathError::TooLong {
                len: path.len(),
                max: max_bytes,
            });
        }

        let (delimiter, body) = match path.strip_prefix('/') {
            Some(rest) => (Delimiter::Slash, rest),
            None => (Delimiter::Dot, path),
        };

        if body.is_empty() {
            return Err(PathError::Empty);
        }
        if delimiter == Delimiter::Dot && body.starts_with(is_separator) {
            return Err(PathError::LeadingDelimiter(path.to_string()));
        }
        if body.ends_with(is_separator) {
            return Err(PathError::TrailingDelimiter(path.to_string()));
        }

        let mut segments = Vec::new();
        for (index, segment) in body.split(is_separator).enumerate() {
            if segment.trim().is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    index,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: path.to_string(),
            delimiter,
            segments,
        })
    }

    /// Get the raw path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Get the delimiter convention the path was written in.
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Get the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Canonical absolute form, e.g. "/test1/resourceInt".
    pub fn canonical(&self) -> String {
        let mut out = String::with_capacity(self.raw.len() + 1);
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }

    /// Return a copy of this path nested under `segment`.
    ///
    /// Used to place application-namespaced resources under the app name.
    pub fn prefixed(&self, segment: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(segment.to_string());
        segments.extend(self.segments.iter().cloned());
        Self {
            raw: self.raw.clone(),
            delimiter: self.delimiter,
            segments,
        }
    }

    /// Check if this path starts with the given segments.
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.segments.starts_with(prefix)
    }
}

/// Validate a single path segment such as an application name.
pub fn parse_segment(segment: &str) -> Result<String, PathError> {
    let path = ResourcePath::parse(segment)?;
    if path.delimiter != Delimiter::Dot || path.segments.len() != 1 {
        return Err(PathError::NotASegment(segment.to_string()));
    }
    Ok(segment.to_string())
}

impl PartialEq for ResourcePath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for ResourcePath {}

impl std::hash::Hash for ResourcePath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl std::str::FromStr for ResourcePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourcePath::parse(s)
    }
}

/// Reasons a path string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Path is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Relative path starts with a delimiter: {0:?}")]
    LeadingDelimiter(String),

    #[error("Path ends with a delimiter: {0:?}")]
    TrailingDelimiter(String),

    #[error("Empty segment {index} in path {path:?}")]
    EmptySegment { path: String, index: usize },

    #[error("Expected a single path segment: {0:?}")]
    NotASegment(String),
}
