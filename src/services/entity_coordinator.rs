//! Entity cache and fetch coordinator.
//!
//! Process-wide, in-memory cache over the remote entity client. Lookups are
//! read-through: a cache hit is returned immediately with no freshness
//! check, a miss fetches, stores, and returns. Fetching a project also
//! seeds the rule cache from the project's rule references, so a follow-up
//! rule lookup usually costs nothing.
//!
//! There is no eviction, TTL, or capacity bound: entries live for the
//! process lifetime and are only overwritten individually (on update) or
//! dropped together (on [`EntityCoordinator::clear`]). Staleness versus the
//! remote store is tolerated — documents are typically edited through this
//! bridge while a tool-call session is live, not externally.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::domain::errors::ApiResult;
use crate::domain::models::{Project, Rule, RulePage, RuleSlot};
use crate::domain::ports::EntityClient;

/// Coordinates entity lookups through a per-kind cache.
///
/// Construct one instance at startup and inject it into the tool-call
/// handler; tests construct isolated instances around a mock client.
/// The maps sit behind `std::sync::Mutex` because cache writes from a
/// project cascade can interleave with a direct rule lookup on a
/// multithreaded runtime. Locks are never held across an await; racing
/// writes for the same id are last-write-wins and idempotent.
pub struct EntityCoordinator<C: EntityClient> {
    client: Arc<C>,
    projects: Mutex<HashMap<String, Project>>,
    rules: Mutex<HashMap<String, Rule>>,
}

impl<C: EntityClient> EntityCoordinator<C> {
    /// Create a coordinator with empty caches.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            projects: Mutex::new(HashMap::new()),
            rules: Mutex::new(HashMap::new()),
        }
    }

    /// Get a project by id, serving from cache when possible.
    ///
    /// On a miss the fetched project is cached and its rule references are
    /// cascaded into the rule cache: embedded rules are inserted directly
    /// (zero extra client calls), bare-id references are fetched through
    /// [`get_rule`](Self::get_rule). The cascade is awaited before the
    /// project is returned, so once this call completes every referenced
    /// rule id that could be fetched is cached.
    ///
    /// A cascade fetch failure is logged and swallowed: warming is
    /// opportunistic, and the failed id stays uncached so the next direct
    /// lookup retries the network.
    pub async fn get_project(&self, id: &str) -> ApiResult<Project> {
        if let Some(cached) = self.projects.lock().unwrap_or_else(|e| e.into_inner()).get(id) {
            tracing::debug!(project_id = %id, "project cache hit");
            return Ok(cached.clone());
        }

        tracing::debug!(project_id = %id, "project cache miss, fetching");
        let project = self.client.fetch_project(id).await?;
        self.projects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), project.clone());

        self.warm_rules_from(&project).await;

        Ok(project)
    }

    /// Seed the rule cache from a freshly fetched project.
    async fn warm_rules_from(&self, project: &Project) {
        for entry in &project.rules {
            match &entry.rule {
                RuleSlot::Embedded(rule) => {
                    let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
                    if !rules.contains_key(&rule.id) {
                        tracing::debug!(rule_id = %rule.id, "seeding rule cache from embedded reference");
                        rules.insert(rule.id.clone(), rule.clone());
                    }
                }
                RuleSlot::Reference(rule_id) => {
                    if let Err(err) = self.get_rule(rule_id).await {
                        tracing::warn!(
                            rule_id = %rule_id,
                            error = %err,
                            "cascade rule fetch failed, leaving id uncached"
                        );
                    }
                }
            }
        }
    }

    /// Get a rule by id, serving from cache when possible.
    pub async fn get_rule(&self, id: &str) -> ApiResult<Rule> {
        if let Some(cached) = self.rules.lock().unwrap_or_else(|e| e.into_inner()).get(id) {
            tracing::debug!(rule_id = %id, "rule cache hit");
            return Ok(cached.clone());
        }

        tracing::debug!(rule_id = %id, "rule cache miss, fetching");
        let rule = self.client.fetch_rule(id).await?;
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), rule.clone());
        Ok(rule)
    }

    /// List the rules owned by the current credential.
    ///
    /// Always fetches fresh: ownership lists go stale too easily to be
    /// worth caching, and the "current owner" identity is ambient to the
    /// credential rather than an explicit cache key. Results are not
    /// written into the rule cache either.
    pub async fn get_owned_rules(&self) -> ApiResult<RulePage> {
        self.client.fetch_owned_rules().await
    }

    /// Replace a rule's content remotely, then patch the cached copy.
    ///
    /// After the remote write succeeds, the last-known cached rule (fetched
    /// first via [`get_rule`](Self::get_rule) if absent) has only its
    /// content field overwritten and is stored back. Merging locally keeps
    /// the cache's view of the non-content fields pinned to what this
    /// process last saw instead of trusting the write response's shape.
    pub async fn update_rule(&self, id: &str, content: &str) -> ApiResult<()> {
        self.client.update_rule(id, content).await?;

        let base = self.get_rule(id).await?;
        let merged = base.with_content(content);
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), merged);
        Ok(())
    }

    /// Empty both caches.
    pub fn clear(&self) {
        self.projects.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.rules.lock().unwrap_or_else(|e| e.into_inner()).clear();
        tracing::debug!("entity caches cleared");
    }

    /// Whether a project id is currently cached. Test and introspection aid.
    pub fn has_project(&self, id: &str) -> bool {
        self.projects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    /// Whether a rule id is currently cached. Test and introspection aid.
    pub fn has_rule(&self, id: &str) -> bool {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }
}
