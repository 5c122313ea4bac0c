use crate::agents::{AgentError, Classifier, QueryBuilder, QueryPlan};
use crate::config::OpenAiSettings;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::debug;

const CLASSIFY_PROMPT: &str = r#"You route questions about comic book characters.

Decide two things about the user's question:
1. kind: "hero" if it is about heroes, "villain" if it is about villains.
   Anti-heroes and vigilantes count as heroes.
2. scope: "single" if it asks for one specific character ("find Batman",
   "get Spider-Man", "show me Superman"), "multiple" if it asks for several
   characters or a category ("all Marvel heroes", "DC heroes").

Also list the character names to search for in "names", most likely
spelling first, then up to two alternative spellings or full names
(for example ["Joker", "The Joker"]). When several specific characters
are named ("Joker and Bane"), list each of them once instead. Use an empty
list for categories.

Answer with a single JSON object and nothing else:
{"kind": "hero" | "villain", "scope": "single" | "multiple", "names": ["..."]}"#;

const SQL_PROMPT: &str = r#"You write SQLite queries for a table of comic book heroes.

Table heroes:
- id INTEGER PRIMARY KEY
- name TEXT
- alias TEXT, nullable: the hero's real name
- universe TEXT: either 'DC comics' or 'Marvel'

Rules:
- Always start with SELECT * FROM heroes
- Use LIKE for partial or case-insensitive matches, = for exact matches
- Use single quotes for string literals
- Exactly one statement, read-only
- Reply with the query only: no explanation, no markdown"#;

/// Classifier and query builder backed by a chat-completion model.
pub struct OpenAiAgent {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAgent {
    pub fn new(settings: &OpenAiSettings) -> Result<Self, AgentError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AgentError::MissingApiKey)?;

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_base) = &settings.api_base {
            config = config.with_api_base(api_base);
        }

        Ok(Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
        })
    }

    async fn complete(&self, instructions: &str, input: String) -> Result<String, AgentError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instructions)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(input)
                    .build()?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .temperature(0.0)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        debug!("Model replied: {}", content);
        Ok(content)
    }
}

/// Remove a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = match body.find('\n') {
        Some(newline) if !body[..newline].trim().contains(' ') => &body[newline + 1..],
        _ => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_plan(output: &str) -> Result<QueryPlan, AgentError> {
    let body = strip_code_fence(output);
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(AgentError::Malformed(output.to_string())),
    };
    let mut plan: QueryPlan =
        serde_json::from_str(json).map_err(|e| AgentError::Malformed(e.to_string()))?;
    plan.names.retain(|name| !name.trim().is_empty());
    Ok(plan)
}

#[async_trait]
impl Classifier for OpenAiAgent {
    async fn classify(&self, query: &str) -> Result<QueryPlan, AgentError> {
        let output = self.complete(CLASSIFY_PROMPT, query.to_string()).await?;
        parse_plan(&output)
    }
}

#[async_trait]
impl QueryBuilder for OpenAiAgent {
    async fn build_select(&self, query: &str) -> Result<String, AgentError> {
        let output = self
            .complete(SQL_PROMPT, format!("Generate SQL for: {query}"))
            .await?;
        Ok(strip_code_fence(&output).to_string())
    }
}
