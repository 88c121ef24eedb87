//! Resource identity types

use serde::{Deserialize, Serialize};

/// Identifier selecting which resource to fetch.
///
/// An empty identifier means "nothing selected": submitting it issues no
/// request and returns the machine to `Idle`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(Box<str>);

impl ResourceId {
    /// Create a new resource identifier
    pub fn new(id: impl Into<Box<str>>) -> Self {
        Self(id.into())
    }

    /// The empty identifier ("nothing selected")
    pub fn empty() -> Self {
        Self("".into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no resource is selected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceId({:?})", self.0)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Get current time in milliseconds since UNIX epoch
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifier() {
        assert!(ResourceId::empty().is_empty());
        assert!(ResourceId::from("").is_empty());
        assert!(!ResourceId::from("pikachu").is_empty());
    }

    #[test]
    fn display_and_debug() {
        let id = ResourceId::from("pikachu");
        assert_eq!(id.to_string(), "pikachu");
        assert_eq!(format!("{:?}", id), "ResourceId(\"pikachu\")");
    }
}
