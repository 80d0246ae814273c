//! Integration tests for the entity cache and fetch coordinator.
//!
//! Uses an in-memory mock client with per-operation call counters so every
//! caching property can be asserted as "exactly N network calls".

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rulebridge::domain::errors::{ApiError, ApiResult};
use rulebridge::domain::models::{Project, Rule, RulePage, RuleRef, RuleSlot};
use rulebridge::domain::ports::EntityClient;
use rulebridge::services::EntityCoordinator;

/// Mock entity client backed by in-memory maps, counting every call.
#[derive(Default)]
struct MockEntityClient {
    projects: Mutex<HashMap<String, Project>>,
    rules: Mutex<HashMap<String, Rule>>,
    owned: Mutex<Vec<Rule>>,
    project_calls: AtomicUsize,
    rule_calls: AtomicUsize,
    owned_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MockEntityClient {
    fn with_rule(self, rule: Rule) -> Self {
        self.rules.lock().unwrap().insert(rule.id.clone(), rule);
        self
    }

    fn with_project(self, project: Project) -> Self {
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        self
    }

    fn with_owned(self, rules: Vec<Rule>) -> Self {
        *self.owned.lock().unwrap() = rules;
        self
    }

    fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    fn rule_calls(&self) -> usize {
        self.rule_calls.load(Ordering::SeqCst)
    }

    fn owned_calls(&self) -> usize {
        self.owned_calls.load(Ordering::SeqCst)
    }

    fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityClient for MockEntityClient {
    async fn fetch_project(&self, id: &str) -> ApiResult<Project> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        self.projects
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::project_not_found(id))
    }

    async fn fetch_rule(&self, id: &str) -> ApiResult<Rule> {
        self.rule_calls.fetch_add(1, Ordering::SeqCst);
        self.rules
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::rule_not_found(id))
    }

    async fn fetch_owned_rules(&self) -> ApiResult<RulePage> {
        self.owned_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.owned.lock().unwrap().clone();
        let total = items.len() as u64;
        Ok(RulePage {
            items,
            total,
            page: 1,
            has_next: false,
        })
    }

    async fn update_rule(&self, id: &str, content: &str) -> ApiResult<Rule> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .get_mut(id)
            .ok_or_else(|| ApiError::rule_not_found(id))?;
        rule.content = content.to_string();
        Ok(rule.clone())
    }
}

fn rule(id: &str, title: &str, content: &str) -> Rule {
    Rule {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        globs: None,
        content: content.to_string(),
        private: false,
    }
}

fn embedded_ref(rule: Rule, alias: Option<&str>) -> RuleRef {
    RuleRef {
        rule: RuleSlot::Embedded(rule),
        alias: alias.map(String::from),
    }
}

fn bare_ref(id: &str, alias: Option<&str>) -> RuleRef {
    RuleRef {
        rule: RuleSlot::Reference(id.to_string()),
        alias: alias.map(String::from),
    }
}

#[tokio::test]
async fn test_repeated_rule_get_is_idempotent_and_cached() {
    let client = Arc::new(MockEntityClient::default().with_rule(rule("r1", "A", "body")));
    let coordinator = EntityCoordinator::new(client.clone());

    let first = coordinator.get_rule("r1").await.expect("first get");
    let second = coordinator.get_rule("r1").await.expect("second get");

    assert_eq!(first, second);
    assert_eq!(client.rule_calls(), 1, "second get must be served from cache");
}

#[tokio::test]
async fn test_repeated_project_get_is_idempotent_and_cached() {
    let client = Arc::new(MockEntityClient::default().with_project(Project {
        id: "p1".to_string(),
        description: "d".to_string(),
        rules: vec![],
    }));
    let coordinator = EntityCoordinator::new(client.clone());

    let first = coordinator.get_project("p1").await.expect("first get");
    let second = coordinator.get_project("p1").await.expect("second get");

    assert_eq!(first, second);
    assert_eq!(client.project_calls(), 1);
}

#[tokio::test]
async fn test_cascade_populates_rule_cache() {
    let client = Arc::new(
        MockEntityClient::default()
            .with_rule(rule("r2", "B", "b body"))
            .with_project(Project {
                id: "p1".to_string(),
                description: "d".to_string(),
                rules: vec![
                    embedded_ref(rule("r1", "A", "a body"), None),
                    bare_ref("r2", Some("B alias")),
                ],
            }),
    );
    let coordinator = EntityCoordinator::new(client.clone());

    coordinator.get_project("p1").await.expect("get project");

    assert!(coordinator.has_project("p1"));
    assert!(coordinator.has_rule("r1"), "embedded rule must be seeded");
    assert!(coordinator.has_rule("r2"), "bare reference must be fetched");
    assert_eq!(client.project_calls(), 1);
    assert_eq!(
        client.rule_calls(),
        1,
        "embedded rules cost zero calls, bare ids exactly one each"
    );

    // Both rules now come straight from cache.
    let r1 = coordinator.get_rule("r1").await.expect("r1");
    let r2 = coordinator.get_rule("r2").await.expect("r2");
    assert_eq!(r1.title, "A");
    assert_eq!(r2.title, "B");
    assert_eq!(client.rule_calls(), 1);
}

#[tokio::test]
async fn test_cascade_does_not_overwrite_already_cached_rule() {
    let client = Arc::new(
        MockEntityClient::default()
            .with_rule(rule("r1", "Fetched", "fetched body"))
            .with_project(Project {
                id: "p1".to_string(),
                description: "d".to_string(),
                rules: vec![embedded_ref(rule("r1", "Embedded stale", "stale"), None)],
            }),
    );
    let coordinator = EntityCoordinator::new(client.clone());

    // Direct fetch first, then the project embeds an older copy of r1.
    coordinator.get_rule("r1").await.expect("direct get");
    coordinator.get_project("p1").await.expect("get project");

    let cached = coordinator.get_rule("r1").await.expect("cached get");
    assert_eq!(cached.title, "Fetched", "seed must not clobber existing entry");
}

#[tokio::test]
async fn test_cascade_fetch_failure_does_not_fail_project() {
    // Project references a rule the remote store no longer has.
    let client = Arc::new(MockEntityClient::default().with_project(Project {
        id: "p1".to_string(),
        description: "d".to_string(),
        rules: vec![bare_ref("ghost", None)],
    }));
    let coordinator = EntityCoordinator::new(client.clone());

    let project = coordinator.get_project("p1").await.expect("project returns");
    assert_eq!(project.id, "p1");
    assert!(!coordinator.has_rule("ghost"));
    assert_eq!(client.rule_calls(), 1);
}

#[tokio::test]
async fn test_update_merges_content_into_cached_rule() {
    let mut base = rule("r1", "T", "old");
    base.private = false;
    let client = Arc::new(MockEntityClient::default().with_rule(base));
    let coordinator = EntityCoordinator::new(client.clone());

    coordinator.get_rule("r1").await.expect("seed cache");
    coordinator.update_rule("r1", "new").await.expect("update");

    let cached = coordinator.get_rule("r1").await.expect("cached get");
    assert_eq!(cached.id, "r1");
    assert_eq!(cached.title, "T");
    assert_eq!(cached.content, "new");
    assert!(!cached.private);
    assert_eq!(client.update_calls(), 1);
    assert_eq!(client.rule_calls(), 1, "cached base needs no refetch");
}

#[tokio::test]
async fn test_update_of_uncached_rule_fetches_base_first() {
    let client = Arc::new(MockEntityClient::default().with_rule(rule("r1", "T", "old")));
    let coordinator = EntityCoordinator::new(client.clone());

    coordinator.update_rule("r1", "new").await.expect("update");

    assert_eq!(client.update_calls(), 1);
    assert_eq!(client.rule_calls(), 1, "base fetched once for the merge");
    let cached = coordinator.get_rule("r1").await.expect("cached get");
    assert_eq!(cached.content, "new");
    assert_eq!(client.rule_calls(), 1);
}

#[tokio::test]
async fn test_failed_lookup_is_not_negatively_cached() {
    let client = Arc::new(MockEntityClient::default());
    let coordinator = EntityCoordinator::new(client.clone());

    let first = coordinator.get_rule("missing").await;
    let second = coordinator.get_rule("missing").await;

    assert!(matches!(first, Err(ApiError::NotFound { .. })));
    assert!(matches!(second, Err(ApiError::NotFound { .. })));
    assert_eq!(
        client.rule_calls(),
        2,
        "each failed lookup must hit the network again"
    );
}

#[tokio::test]
async fn test_owned_rules_always_bypass_cache() {
    let client = Arc::new(
        MockEntityClient::default().with_owned(vec![rule("r1", "A", "a"), rule("r2", "B", "b")]),
    );
    let coordinator = EntityCoordinator::new(client.clone());

    let first = coordinator.get_owned_rules().await.expect("first list");
    let second = coordinator.get_owned_rules().await.expect("second list");

    assert_eq!(first.items.len(), 2);
    assert_eq!(second.total, 2);
    assert_eq!(client.owned_calls(), 2, "never served from cache");
    assert!(!coordinator.has_rule("r1"), "list results are not cached");
}

#[tokio::test]
async fn test_clear_resets_both_caches() {
    let client = Arc::new(
        MockEntityClient::default()
            .with_rule(rule("r1", "A", "a"))
            .with_project(Project {
                id: "p1".to_string(),
                description: "d".to_string(),
                rules: vec![],
            }),
    );
    let coordinator = EntityCoordinator::new(client.clone());

    coordinator.get_project("p1").await.expect("get project");
    coordinator.get_rule("r1").await.expect("get rule");
    assert_eq!(client.project_calls(), 1);
    assert_eq!(client.rule_calls(), 1);

    coordinator.clear();
    assert!(!coordinator.has_project("p1"));
    assert!(!coordinator.has_rule("r1"));

    coordinator.get_project("p1").await.expect("refetch project");
    coordinator.get_rule("r1").await.expect("refetch rule");
    assert_eq!(client.project_calls(), 2);
    assert_eq!(client.rule_calls(), 2);
}

#[tokio::test]
async fn test_client_errors_propagate_unchanged() {
    struct AuthFailClient;

    #[async_trait]
    impl EntityClient for AuthFailClient {
        async fn fetch_project(&self, _id: &str) -> ApiResult<Project> {
            Err(ApiError::Auth("key rejected".to_string()))
        }
        async fn fetch_rule(&self, _id: &str) -> ApiResult<Rule> {
            Err(ApiError::Auth("key rejected".to_string()))
        }
        async fn fetch_owned_rules(&self) -> ApiResult<RulePage> {
            Err(ApiError::Auth("key rejected".to_string()))
        }
        async fn update_rule(&self, _id: &str, _content: &str) -> ApiResult<Rule> {
            Err(ApiError::Auth("key rejected".to_string()))
        }
    }

    let coordinator = EntityCoordinator::new(Arc::new(AuthFailClient));
    assert!(matches!(
        coordinator.get_project("p1").await,
        Err(ApiError::Auth(_))
    ));
    assert!(matches!(
        coordinator.get_rule("r1").await,
        Err(ApiError::Auth(_))
    ));
    assert!(matches!(
        coordinator.get_owned_rules().await,
        Err(ApiError::Auth(_))
    ));
    assert!(matches!(
        coordinator.update_rule("r1", "x").await,
        Err(ApiError::Auth(_))
    ));
}

/// Scenario from the design discussion: a project mixing one embedded rule
/// and one bare reference, asserted end to end.
#[tokio::test]
async fn test_mixed_reference_scenario() {
    let client = Arc::new(
        MockEntityClient::default()
            .with_rule(rule("r2", "B", "b body"))
            .with_project(Project {
                id: "p1".to_string(),
                description: "d".to_string(),
                rules: vec![
                    embedded_ref(rule("r1", "A", "a body"), None),
                    bare_ref("r2", Some("B")),
                ],
            }),
    );
    let coordinator = EntityCoordinator::new(client.clone());

    let project = coordinator.get_project("p1").await.expect("get project");

    assert_eq!(project.id, "p1");
    assert!(coordinator.has_project("p1"));
    assert!(coordinator.has_rule("r1"));
    assert!(coordinator.has_rule("r2"));
    assert_eq!(client.rule_calls(), 1, "exactly one fetch, for r2");

    let r1 = coordinator.get_rule("r1").await.expect("r1 from cache");
    assert_eq!(r1.title, "A");
    assert_eq!(client.rule_calls(), 1, "r1 came from the embedded value");
}
