//! Logical channel (namespace) naming
//!
//! A namespace is the broadcast scope every connected peer implicitly joins.
//! Names are slash-separated segments: `/`, `/dashboard`, `/dashboard/team-1`.
//! Each segment must match: [a-zA-Z0-9_-]+

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The namespace every client joins unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "/";

/// Valid characters for a namespace segment
fn is_valid_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("namespace cannot be empty")]
    Empty,

    #[error("namespace must start with '/'")]
    MissingLeadingSlash,

    #[error("empty segment in namespace")]
    EmptySegment,

    #[error("invalid segment '{0}': must match [a-zA-Z0-9_-]+")]
    InvalidSegment(String),
}

/// A validated namespace name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    name: String,
}

impl Namespace {
    /// Parse and validate a namespace name
    pub fn parse(name: &str) -> Result<Self, NamespaceError> {
        if name.is_empty() {
            return Err(NamespaceError::Empty);
        }

        let rest = name
            .strip_prefix('/')
            .ok_or(NamespaceError::MissingLeadingSlash)?;

        // Root namespace
        if rest.is_empty() {
            return Ok(Self::root());
        }

        for part in rest.split('/') {
            if part.is_empty() {
                return Err(NamespaceError::EmptySegment);
            }
            if !part.chars().all(is_valid_segment_char) {
                return Err(NamespaceError::InvalidSegment(part.to_string()));
            }
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    /// The root namespace `/`
    pub fn root() -> Self {
        Self {
            name: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name == DEFAULT_NAMESPACE
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_parse_valid() {
        assert!(Namespace::parse("/").is_ok());
        assert!(Namespace::parse("/dashboard").is_ok());
        assert!(Namespace::parse("/dashboard/team-1").is_ok());
        assert!(Namespace::parse("/widgets/memo_board").is_ok());
    }

    #[test]
    fn test_namespace_parse_invalid() {
        assert_eq!(Namespace::parse(""), Err(NamespaceError::Empty));
        assert_eq!(
            Namespace::parse("dashboard"),
            Err(NamespaceError::MissingLeadingSlash)
        );
        assert_eq!(
            Namespace::parse("/dashboard//x"),
            Err(NamespaceError::EmptySegment)
        );
        assert_eq!(
            Namespace::parse("/dashboard/"),
            Err(NamespaceError::EmptySegment)
        );
        assert!(matches!(
            Namespace::parse("/dash board"),
            Err(NamespaceError::InvalidSegment(_))
        ));
    }

    #[test]
    fn test_root_namespace() {
        let root = Namespace::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root, Namespace::default());
        assert_eq!(root.as_str(), "/");
    }

    #[test]
    fn test_nested_namespace_display() {
        let ns: Namespace = "/dashboard/team-1".parse().unwrap();
        assert!(!ns.is_root());
        assert_eq!(ns.to_string(), "/dashboard/team-1");
    }
}
