//! Client for the external character search service used for villains.
//!
//! The service answers `GET <base>/<key>/search/<name>` with a document whose
//! `response` field says whether the search succeeded; a 200 can still carry
//! `"response": "error"` for an unknown name.

use crate::config::SuperheroSettings;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("SUPERHERO_API_KEY not found in environment variables or provided as argument")]
    MissingApiKey,
    #[error("character name must not be empty")]
    EmptyName,
    #[error("invalid lookup base url {0:?}")]
    InvalidBaseUrl(String),
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Raw search document. `results` stays untyped because the service returns
/// either an array or a single object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default, rename = "results-for", skip_serializing_if = "Option::is_none")]
    pub results_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("success")
    }
}

#[async_trait]
pub trait CharacterLookup: Send + Sync {
    async fn search(&self, name: &str) -> Result<SearchResponse, LookupError>;
}

pub struct SuperheroClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl SuperheroClient {
    /// Fails when no API key is configured or the base url does not parse.
    /// `client` should carry the request timeout.
    pub fn new(client: reqwest::Client, settings: &SuperheroSettings) -> Result<Self, LookupError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LookupError::MissingApiKey)?;
        let base_url = Url::parse(settings.api_base.trim_end_matches('/'))
            .map_err(|_| LookupError::InvalidBaseUrl(settings.api_base.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidBaseUrl(settings.api_base.clone()));
        }
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn http_client(settings: &SuperheroSettings) -> Result<reqwest::Client, LookupError> {
        Ok(reqwest::Client::builder().timeout(settings.timeout).build()?)
    }

    fn search_url(&self, name: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&self.api_key)
            .push("search")
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl CharacterLookup for SuperheroClient {
    async fn search(&self, name: &str) -> Result<SearchResponse, LookupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::EmptyName);
        }

        let response = self
            .client
            .get(self.search_url(name)?)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<SearchResponse>().await?)
    }
}

/// Stands in for a client that could not be built, so the failure is only
/// reported by requests that actually need the remote service.
pub struct UnavailableLookup {
    reason: String,
}

impl UnavailableLookup {
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl CharacterLookup for UnavailableLookup {
    async fn search(&self, _name: &str) -> Result<SearchResponse, LookupError> {
        Err(LookupError::Unavailable(self.reason.clone()))
    }
}
