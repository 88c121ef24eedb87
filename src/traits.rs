//! Request collaborator trait

use crate::ResourceId;
use async_trait::async_trait;

/// Request-issuing collaborator.
///
/// Resolves with a payload or fails with an error; the error value is
/// captured verbatim into `FetchState::Rejected`. Transport, timeouts and
/// retries are the implementer's concern, not the machine's.
///
/// # Example
///
/// ```rust,ignore
/// struct PokeApi { client: reqwest::Client }
///
/// #[async_trait]
/// impl ResourceFetcher for PokeApi {
///     type Payload = Pokemon;
///     type Error = RequestError;
///
///     async fn fetch(&self, id: &ResourceId) -> Result<Pokemon, RequestError> {
///         // GET /pokemon/{id}
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    /// Payload type a successful request resolves with
    type Payload: Send + 'static;
    /// Error type a failed request rejects with
    type Error: Send + 'static;

    /// Issue the request for `id`
    async fn fetch(&self, id: &ResourceId) -> Result<Self::Payload, Self::Error>;
}
