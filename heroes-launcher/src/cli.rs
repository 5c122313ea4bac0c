use backend::config::{AgentKind, Settings};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Agent {
    /// Classify and write queries with a language model.
    Openai,
    /// Classify with the built-in villain list and keyword rules.
    Rules,
}

#[derive(Parser)]
pub struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
    /// CSV with `name,real name,universe` columns, loaded at startup.
    #[arg(long, default_value = "heroes.csv")]
    pub seed: PathBuf,
    #[arg(long, default_value = "heroes.db")]
    pub database: PathBuf,
    #[arg(long, value_enum, default_value_t = Agent::Openai)]
    pub agent: Agent,
    #[arg(long)]
    pub model: Option<String>,
    /// Remote searches allowed per query; at least 1.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_lookup_attempts: Option<u64>,
    /// Look single heroes missing from the local table up remotely.
    #[arg(long)]
    pub remote_fallback: bool,
    /// Extra villain name for the rule-based classifier; may be repeated.
    #[arg(long = "villain")]
    pub villains: Vec<String>,
}

impl Cli {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        settings.database_path = self.database.clone();
        settings.agent = match self.agent {
            Agent::Openai => AgentKind::OpenAi,
            Agent::Rules => AgentKind::Rules,
        };
        if let Some(model) = &self.model {
            settings.openai.model = model.clone();
        }
        if let Some(attempts) = self.max_lookup_attempts {
            settings.max_lookup_attempts = usize::try_from(attempts).unwrap_or(usize::MAX);
        }
        settings.remote_fallback = self.remote_fallback;
        settings.extra_villains = self.villains.clone();
        settings
    }
}
