//! Port trait for the remote entity client.

use async_trait::async_trait;

use crate::domain::errors::ApiResult;
use crate::domain::models::{Project, Rule, RulePage};

/// Remote entity client port.
///
/// Translates entity kind + id (+ optional payload) into an authenticated
/// call against the platform's document API. Implementations are stateless:
/// every operation issues exactly one request, retains nothing between
/// calls, and performs no retries — a failure simply surfaces to the
/// caller.
///
/// The coordinator depends on this trait rather than a concrete HTTP
/// client, so tests can swap in an in-memory mock with call counters.
#[async_trait]
pub trait EntityClient: Send + Sync {
    /// Fetch a project by id.
    async fn fetch_project(&self, id: &str) -> ApiResult<Project>;

    /// Fetch a rule by id.
    async fn fetch_rule(&self, id: &str) -> ApiResult<Rule>;

    /// Fetch the rules owned by the credential's identity.
    ///
    /// Returns a single page descriptor; callers treat it as "all" and do
    /// not paginate further.
    async fn fetch_owned_rules(&self) -> ApiResult<RulePage>;

    /// Replace a rule's content wholesale and return the updated rule.
    ///
    /// This is a full-replace contract: `content` is the complete desired
    /// body, not a diff. A partial body would silently drop prior content.
    async fn update_rule(&self, id: &str, content: &str) -> ApiResult<Rule>;
}
