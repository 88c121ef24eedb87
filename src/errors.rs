//! Default error vocabulary for request collaborators
//!
//! A fetcher may use any error type; this is the vocabulary the crate's
//! own tests and examples speak. Whatever the fetcher fails with is
//! captured verbatim into `FetchState::Rejected` and never thrown, so
//! rendering continues with a fallback view.

use crate::ResourceId;

/// Error from a request collaborator
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The identifier matched no known resource
    #[error("resource not found: {0}")]
    NotFound(ResourceId),
    /// The collaborator itself failed (transport, upstream service)
    #[error("upstream failure: {0}")]
    Upstream(Box<str>),
}

impl RequestError {
    /// Check if this is a not-found failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Upstream failure with a reason
    pub fn upstream(reason: impl Into<Box<str>>) -> Self {
        Self::Upstream(reason.into())
    }
}
