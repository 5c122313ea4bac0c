#![allow(dead_code)]

use async_trait::async_trait;
use backend::agents::{AgentError, Classifier, QueryBuilder, QueryPlan};
use backend::dbs::{HeroStore, SeedRecord, SqliteHeroStore};
use backend::remote::{CharacterLookup, LookupError, SearchResponse};
use backend::resolver::{CharacterResolver, ResolveError, ResolverFactory};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn seed() -> Vec<SeedRecord> {
    vec![
        SeedRecord::new("Batman", Some("Bruce Wayne"), "DC comics"),
        SeedRecord::new("Superman", Some("Clark Kent"), "DC comics"),
        SeedRecord::new("Wonder Woman", Some("Diana Prince"), "DC comics"),
        SeedRecord::new("Spider-Man", Some("Peter Parker"), "Marvel"),
        SeedRecord::new("Iron Man", Some("Tony Stark"), "Marvel"),
        SeedRecord::new("Vision", None, "Marvel"),
    ]
}

/// A store reloaded from [`seed`]. Keep the `TempDir` alive for the test's duration.
pub async fn seeded_store() -> (TempDir, Arc<SqliteHeroStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteHeroStore::new(dir.path().join("heroes.db")));
    store.reload(&seed()).await.unwrap();
    (dir, store)
}

/// Returns a fixed plan and a fixed SQL string.
pub struct FixedAgent {
    pub plan: QueryPlan,
    pub sql: String,
}

impl FixedAgent {
    pub fn new(plan: QueryPlan, sql: &str) -> Arc<Self> {
        Arc::new(Self {
            plan,
            sql: sql.to_string(),
        })
    }
}

#[async_trait]
impl Classifier for FixedAgent {
    async fn classify(&self, _query: &str) -> Result<QueryPlan, AgentError> {
        Ok(self.plan.clone())
    }
}

#[async_trait]
impl QueryBuilder for FixedAgent {
    async fn build_select(&self, _query: &str) -> Result<String, AgentError> {
        Ok(self.sql.clone())
    }
}

/// Canned search documents keyed by lowercase name; records every call.
#[derive(Default)]
pub struct StubLookup {
    responses: HashMap<String, SearchResponse>,
    pub calls: Mutex<Vec<String>>,
}

impl StubLookup {
    pub fn with(mut self, name: &str, response: SearchResponse) -> Self {
        self.responses.insert(name.to_lowercase(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CharacterLookup for StubLookup {
    async fn search(&self, name: &str) -> Result<SearchResponse, LookupError> {
        self.calls.lock().unwrap().push(name.to_string());
        Ok(self
            .responses
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(not_found))
    }
}

pub fn not_found() -> SearchResponse {
    SearchResponse {
        response: "error".to_string(),
        error: Some("character with given name not found".to_string()),
        ..Default::default()
    }
}

pub fn found(name: &str, full_name: &str, alter_egos: &str, publisher: &str) -> SearchResponse {
    SearchResponse {
        response: "success".to_string(),
        results_for: Some(name.to_string()),
        results: Some(json!([{
            "id": "370",
            "name": name,
            "biography": {
                "full-name": full_name,
                "alter-egos": alter_egos,
                "publisher": publisher,
            }
        }])),
        error: None,
    }
}

pub fn resolver(
    agent: Arc<FixedAgent>,
    store: Arc<dyn HeroStore>,
    lookup: Arc<dyn CharacterLookup>,
) -> CharacterResolver {
    CharacterResolver::new(agent.clone(), agent, store, lookup)
}

/// Builds the same resolver setup for every request.
pub struct StubFactory {
    pub agent: Arc<FixedAgent>,
    pub store: Arc<dyn HeroStore>,
    pub lookup: Arc<StubLookup>,
}

impl ResolverFactory for StubFactory {
    fn build(&self) -> Result<CharacterResolver, ResolveError> {
        Ok(resolver(self.agent.clone(), self.store.clone(), self.lookup.clone()))
    }
}
