use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SUPERHERO_API_BASE: &str = "https://www.superheroapi.com/api.php";
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_LOOKUP_ATTEMPTS: usize = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which implementation answers the classification and query-building questions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AgentKind {
    #[default]
    OpenAi,
    Rules,
}

#[derive(Clone, Debug)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    /// `None` keeps the async-openai default endpoint.
    pub api_base: Option<String>,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct SuperheroSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_path: PathBuf,
    pub agent: AgentKind,
    pub openai: OpenAiSettings,
    pub superhero: SuperheroSettings,
    /// Upper bound on remote lookups issued for one request.
    pub max_lookup_attempts: usize,
    /// Retry a single-name hero query remotely when the local store has no row for it.
    pub remote_fallback: bool,
    /// Names added to the rule-based villain allow-list.
    pub extra_villains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("heroes.db"),
            agent: AgentKind::default(),
            openai: OpenAiSettings {
                api_key: None,
                api_base: None,
                model: DEFAULT_MODEL.to_string(),
            },
            superhero: SuperheroSettings {
                api_key: None,
                api_base: DEFAULT_SUPERHERO_API_BASE.to_string(),
                timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            },
            max_lookup_attempts: DEFAULT_MAX_LOOKUP_ATTEMPTS,
            remote_fallback: false,
            extra_villains: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, falling back to defaults.
    ///
    /// | Env Var                      | Default                                |
    /// |------------------------------|----------------------------------------|
    /// | `OPENAI_API_KEY`             | unset                                  |
    /// | `OPENAI_API_BASE`            | async-openai default                   |
    /// | `OPENAI_MODEL`               | `gpt-4o`                               |
    /// | `SUPERHERO_API_KEY`          | unset                                  |
    /// | `SUPERHERO_API_BASE`         | `https://www.superheroapi.com/api.php` |
    /// | `SUPERHERO_TIMEOUT_SECS`     | `10`                                   |
    /// | `HEROES_MAX_LOOKUP_ATTEMPTS` | `3`                                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout_secs = match non_empty("SUPERHERO_TIMEOUT_SECS") {
            Some(value) => parse_number::<u64>("SUPERHERO_TIMEOUT_SECS", "number of seconds", value)?,
            None => DEFAULT_LOOKUP_TIMEOUT_SECS,
        };
        let max_lookup_attempts = match non_empty("HEROES_MAX_LOOKUP_ATTEMPTS") {
            Some(value) => parse_number::<usize>("HEROES_MAX_LOOKUP_ATTEMPTS", "positive integer", value)?,
            None => DEFAULT_MAX_LOOKUP_ATTEMPTS,
        };
        if max_lookup_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "HEROES_MAX_LOOKUP_ATTEMPTS",
                expected: "positive integer",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            openai: OpenAiSettings {
                api_key: non_empty("OPENAI_API_KEY"),
                api_base: non_empty("OPENAI_API_BASE"),
                model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai.model),
            },
            superhero: SuperheroSettings {
                api_key: non_empty("SUPERHERO_API_KEY"),
                api_base: non_empty("SUPERHERO_API_BASE").unwrap_or(defaults.superhero.api_base),
                timeout: Duration::from_secs(timeout_secs),
            },
            max_lookup_attempts,
            ..defaults
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert!(settings.openai.api_key.is_none());
        assert!(settings.superhero.api_key.is_none());
        assert_eq!(settings.openai.model, DEFAULT_MODEL);
        assert_eq!(settings.superhero.api_base, DEFAULT_SUPERHERO_API_BASE);
        assert_eq!(settings.superhero.timeout, Duration::from_secs(10));
        assert_eq!(settings.max_lookup_attempts, 3);
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let settings = settings_from(&[("OPENAI_API_KEY", "  "), ("SUPERHERO_API_KEY", "")]).unwrap();
        assert!(settings.openai.api_key.is_none());
        assert!(settings.superhero.api_key.is_none());
    }

    #[test]
    fn values_are_read_from_environment() {
        let settings = settings_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("SUPERHERO_API_KEY", "abc"),
            ("SUPERHERO_TIMEOUT_SECS", "3"),
            ("HEROES_MAX_LOOKUP_ATTEMPTS", "5"),
        ])
        .unwrap();
        assert_eq!(settings.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.openai.model, "gpt-4o-mini");
        assert_eq!(settings.superhero.api_key.as_deref(), Some("abc"));
        assert_eq!(settings.superhero.timeout, Duration::from_secs(3));
        assert_eq!(settings.max_lookup_attempts, 5);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(settings_from(&[("SUPERHERO_TIMEOUT_SECS", "soon")]).is_err());
        assert!(settings_from(&[("HEROES_MAX_LOOKUP_ATTEMPTS", "0")]).is_err());
    }
}
