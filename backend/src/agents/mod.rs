//! The two judgement calls the resolver cannot make on its own: what a query
//! is asking for, and which local-store query answers it.
//!
//! [`OpenAiAgent`] delegates both to a language model; [`RuleBasedAgent`]
//! answers them deterministically from a villain allow-list and keyword rules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;
pub mod rules;

pub use openai::OpenAiAgent;
pub use rules::RuleBasedAgent;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("OPENAI_API_KEY not found in environment variables or provided as argument")]
    MissingApiKey,
    #[error("OpenAI Error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),
    #[error("model returned no content")]
    EmptyResponse,
    #[error("could not understand model output: {0}")]
    Malformed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Hero,
    Villain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Single,
    Multiple,
}

/// How a free-text query should be answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub kind: CharacterKind,
    pub scope: Scope,
    /// Candidate character names, best guess first. Villain lookups try them in order.
    #[serde(default)]
    pub names: Vec<String>,
}

impl QueryPlan {
    pub fn single(kind: CharacterKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Scope::Single,
            names: vec![name.into()],
        }
    }

    pub fn multiple(kind: CharacterKind) -> Self {
        Self {
            kind,
            scope: Scope::Multiple,
            names: Vec::new(),
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<QueryPlan, AgentError>;
}

#[async_trait]
pub trait QueryBuilder: Send + Sync {
    /// Produce one `SELECT` against the `heroes` table answering `query`.
    async fn build_select(&self, query: &str) -> Result<String, AgentError>;
}
