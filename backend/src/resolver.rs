//! Turns a free-text question into character records.
//!
//! Heroes come from the local store through a generated `SELECT`; villains
//! come from the remote search service. A single-character plan tries its
//! candidate names in order until one yields an acceptable match; a
//! multi-character plan looks up every distinct name and merges the results.
//! Either way at most `max_lookup_attempts` searches are made.

use crate::agents::{
    AgentError, CharacterKind, Classifier, OpenAiAgent, QueryBuilder, QueryPlan, RuleBasedAgent,
    Scope,
};
use crate::config::{AgentKind, Settings};
use crate::dbs::{DbError, HeroStore};
use crate::normalize::{rank_matches, records_from_search};
use crate::remote::{CharacterLookup, LookupError, SuperheroClient, UnavailableLookup};
use shared::models::CharacterRecord;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Store(#[from] DbError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub struct CharacterResolver {
    classifier: Arc<dyn Classifier>,
    query_builder: Arc<dyn QueryBuilder>,
    store: Arc<dyn HeroStore>,
    lookup: Arc<dyn CharacterLookup>,
    max_lookup_attempts: usize,
    remote_fallback: bool,
}

impl CharacterResolver {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        query_builder: Arc<dyn QueryBuilder>,
        store: Arc<dyn HeroStore>,
        lookup: Arc<dyn CharacterLookup>,
    ) -> Self {
        Self {
            classifier,
            query_builder,
            store,
            lookup,
            max_lookup_attempts: 3,
            remote_fallback: false,
        }
    }

    /// At least one attempt is always made.
    pub fn with_max_lookup_attempts(mut self, attempts: usize) -> Self {
        self.max_lookup_attempts = attempts.max(1);
        self
    }

    pub fn with_remote_fallback(mut self, enabled: bool) -> Self {
        self.remote_fallback = enabled;
        self
    }

    pub async fn resolve(&self, query: &str) -> Result<Vec<CharacterRecord>, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let plan = self.classifier.classify(query).await?;
        debug!(?plan, "Classified {:?}", query);

        match plan.kind {
            CharacterKind::Hero => {
                let heroes = self.resolve_heroes(query, &plan).await?;
                if heroes.is_empty() && self.remote_fallback && plan.scope == Scope::Single {
                    info!("No local hero for {:?}, trying the API", query);
                    return self.resolve_villains(&plan).await;
                }
                Ok(heroes)
            }
            CharacterKind::Villain => self.resolve_villains(&plan).await,
        }
    }

    async fn resolve_heroes(
        &self,
        query: &str,
        plan: &QueryPlan,
    ) -> Result<Vec<CharacterRecord>, ResolveError> {
        let sql = self.query_builder.build_select(query).await?;
        info!("Executing {}", sql);
        let rows = self.store.select(&sql).await?;
        let records: Vec<CharacterRecord> = rows.into_iter().map(CharacterRecord::from).collect();

        Ok(match plan.scope {
            Scope::Multiple => records,
            Scope::Single => pick_single(records, &plan.names).into_iter().collect(),
        })
    }

    async fn resolve_villains(&self, plan: &QueryPlan) -> Result<Vec<CharacterRecord>, ResolveError> {
        if plan.names.is_empty() {
            warn!("No villain name to look up");
            return Ok(Vec::new());
        }

        let mut found: Vec<CharacterRecord> = Vec::new();
        let mut searched: Vec<&str> = Vec::new();

        for name in &plan.names {
            let name = name.trim();
            if searched.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                continue;
            }
            if searched.len() == self.max_lookup_attempts {
                warn!("Lookup budget of {} spent, skipping {:?}", self.max_lookup_attempts, name);
                break;
            }
            searched.push(name);

            let matches = self.search_villain(name).await?;
            match plan.scope {
                // Names are alternative spellings of one character: first hit wins.
                Scope::Single => {
                    if let Some(best) = matches.into_iter().next() {
                        return Ok(vec![best]);
                    }
                }
                // Names are distinct characters: keep every match once.
                Scope::Multiple => {
                    for record in matches {
                        if !found.iter().any(|f| f.name.eq_ignore_ascii_case(&record.name)) {
                            found.push(record);
                        }
                    }
                }
            }
        }

        Ok(found)
    }

    async fn search_villain(&self, name: &str) -> Result<Vec<CharacterRecord>, ResolveError> {
        info!("Calling the API with {}", name);
        let response = self.lookup.search(name).await?;
        let matches = rank_matches(records_from_search(&response), name);
        if matches.is_empty() {
            debug!("No acceptable match for {:?}", name);
        }
        Ok(matches)
    }
}

/// One record for a single-character query: an exact (case-insensitive) name
/// match with any candidate if there is one, otherwise the first row.
fn pick_single(records: Vec<CharacterRecord>, names: &[String]) -> Option<CharacterRecord> {
    let exact = records.iter().position(|record| {
        names
            .iter()
            .any(|name| record.name.eq_ignore_ascii_case(name.trim()))
    });
    records.into_iter().nth(exact.unwrap_or(0))
}

/// Builds a [`CharacterResolver`] for each request.
pub trait ResolverFactory: Send + Sync {
    fn build(&self) -> Result<CharacterResolver, ResolveError>;
}

/// Assembles resolvers from [`Settings`]. Credentials are checked on every
/// build: a missing model key fails the request, a missing lookup key only
/// fails requests that reach the remote service.
pub struct SettingsResolverFactory {
    settings: Arc<Settings>,
    store: Arc<dyn HeroStore>,
    http: Result<reqwest::Client, String>,
    rules: Arc<RuleBasedAgent>,
}

impl SettingsResolverFactory {
    pub fn new(settings: Arc<Settings>, store: Arc<dyn HeroStore>) -> Self {
        let http = SuperheroClient::http_client(&settings.superhero).map_err(|e| e.to_string());
        let rules = Arc::new(RuleBasedAgent::new(settings.extra_villains.iter().cloned()));
        Self {
            settings,
            store,
            http,
            rules,
        }
    }

    fn lookup(&self) -> Arc<dyn CharacterLookup> {
        let client = self
            .http
            .clone()
            .map_err(UnavailableLookup::new)
            .and_then(|http| {
                SuperheroClient::new(http, &self.settings.superhero).map_err(UnavailableLookup::new)
            });
        match client {
            Ok(client) => Arc::new(client),
            Err(unavailable) => Arc::new(unavailable),
        }
    }
}

impl ResolverFactory for SettingsResolverFactory {
    fn build(&self) -> Result<CharacterResolver, ResolveError> {
        let (classifier, query_builder): (Arc<dyn Classifier>, Arc<dyn QueryBuilder>) =
            match self.settings.agent {
                AgentKind::OpenAi => {
                    let agent = Arc::new(OpenAiAgent::new(&self.settings.openai)?);
                    let classifier: Arc<dyn Classifier> = agent.clone();
                    let query_builder: Arc<dyn QueryBuilder> = agent;
                    (classifier, query_builder)
                }
                AgentKind::Rules => {
                    let classifier: Arc<dyn Classifier> = self.rules.clone();
                    let query_builder: Arc<dyn QueryBuilder> = self.rules.clone();
                    (classifier, query_builder)
                }
            };

        Ok(CharacterResolver::new(classifier, query_builder, self.store.clone(), self.lookup())
            .with_max_lookup_attempts(self.settings.max_lookup_attempts)
            .with_remote_fallback(self.settings.remote_fallback))
    }
}
