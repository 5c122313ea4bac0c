use crate::agents::{AgentError, CharacterKind, Classifier, QueryBuilder, QueryPlan, Scope};
use async_trait::async_trait;

const KNOWN_VILLAINS: &[&str] = &[
    "Joker", "Lex Luthor", "Darkseid", "Bane", "Harley Quinn", "Penguin", "Riddler",
    "Two-Face", "Scarecrow", "Poison Ivy", "Sinestro", "Brainiac", "Deathstroke",
    "Black Adam", "Reverse-Flash", "Ra's al Ghul", "Black Manta", "Cheetah", "Doomsday",
    "Thanos", "Magneto", "Loki", "Green Goblin", "Doctor Doom", "Venom", "Carnage",
    "Ultron", "Red Skull", "Doctor Octopus", "Kingpin", "Mystique", "Galactus", "Hela",
    "Kang", "Sabretooth", "Juggernaut", "Mysterio", "Sandman", "Vulture", "Electro",
];

/// Leading phrases stripped before the remainder is taken as a character name.
const LEAD_INS: &[&str] = &[
    "tell me about", "search for", "look up", "show me", "give me", "who is", "find me",
    "find", "get", "show", "fetch", "search", "lookup", "list",
];

const CATEGORY_WORDS: &[&str] = &["all", "every", "heroes", "villains", "characters", "list"];

/// Deterministic classifier and query builder.
///
/// A query is about a villain when it names one from the allow-list (or says
/// "villain"), and about a category when it uses a plural or quantifier word.
pub struct RuleBasedAgent {
    villains: Vec<String>,
}

impl Default for RuleBasedAgent {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl RuleBasedAgent {
    pub fn new<I, S>(extra_villains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut villains: Vec<String> = KNOWN_VILLAINS.iter().map(|v| v.to_string()).collect();
        villains.extend(
            extra_villains
                .into_iter()
                .map(Into::into)
                .filter(|v: &String| !v.trim().is_empty()),
        );
        Self { villains }
    }

    pub fn plan(&self, query: &str) -> QueryPlan {
        let words = words(query);
        let is_category = words.iter().any(|w| CATEGORY_WORDS.contains(&w.as_str()));
        let mentioned = self.mentioned_villain(query);
        let kind = if mentioned.is_some() || words.iter().any(|w| w == "villain" || w == "villains") {
            CharacterKind::Villain
        } else {
            CharacterKind::Hero
        };

        if is_category {
            return QueryPlan::multiple(kind);
        }

        let full = extract_name(query);
        let bare = strip_article(full);
        let candidates = match kind {
            CharacterKind::Villain => vec![bare],
            CharacterKind::Hero => vec![full, bare],
        };
        let mut names: Vec<String> = mentioned.map(str::to_string).into_iter().collect();
        for candidate in candidates {
            if !candidate.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(candidate)) {
                names.push(candidate.to_string());
            }
        }

        QueryPlan {
            kind,
            scope: Scope::Single,
            names,
        }
    }

    /// Longest allow-listed name appearing in the query as whole words.
    fn mentioned_villain(&self, query: &str) -> Option<&str> {
        let haystack = format!(" {} ", words(query).join(" "));
        self.villains
            .iter()
            .filter(|villain| {
                let needle = format!(" {} ", words(villain).join(" "));
                !needle.trim().is_empty() && haystack.contains(&needle)
            })
            .max_by_key(|villain| villain.len())
            .map(String::as_str)
    }

    pub fn select_for(&self, query: &str) -> String {
        let plan = self.plan(query);
        let words = words(query);
        match plan.scope {
            Scope::Multiple => {
                if words.iter().any(|w| w == "marvel") {
                    "SELECT * FROM heroes WHERE universe = 'Marvel'".to_string()
                } else if words.iter().any(|w| w == "dc") {
                    "SELECT * FROM heroes WHERE universe = 'DC comics'".to_string()
                } else {
                    "SELECT * FROM heroes".to_string()
                }
            }
            Scope::Single => {
                let full = extract_name(query);
                let bare = strip_article(full);
                let name = sql_literal(full);
                if bare.len() == full.len() {
                    format!("SELECT * FROM heroes WHERE name LIKE {name} OR alias LIKE {name}")
                } else {
                    let bare = sql_literal(bare);
                    format!(
                        "SELECT * FROM heroes WHERE name LIKE {name} OR name LIKE {bare} OR alias LIKE {name}"
                    )
                }
            }
        }
    }
}

/// Lowercased alphanumeric words; `-` and `'` stay inside words.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// The query with a lead-in verb and trailing punctuation removed.
fn extract_name(query: &str) -> &str {
    let mut rest = query.trim();
    for lead_in in LEAD_INS {
        if rest.len() > lead_in.len()
            && rest.is_char_boundary(lead_in.len())
            && rest[..lead_in.len()].eq_ignore_ascii_case(lead_in)
            && rest[lead_in.len()..].starts_with(char::is_whitespace)
        {
            rest = rest[lead_in.len()..].trim_start();
            break;
        }
    }
    rest.trim_end_matches(|c: char| c == '?' || c == '.' || c == '!' || c.is_whitespace())
}

/// `name` without a leading "the". Seeded names such as "The Flash" keep it,
/// so store lookups try both forms.
fn strip_article(name: &str) -> &str {
    match name.get(..4) {
        Some(article) if article.eq_ignore_ascii_case("the ") => name[4..].trim_start(),
        _ => name,
    }
}

fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl Classifier for RuleBasedAgent {
    async fn classify(&self, query: &str) -> Result<QueryPlan, AgentError> {
        Ok(self.plan(query))
    }
}

#[async_trait]
impl QueryBuilder for RuleBasedAgent {
    async fn build_select(&self, query: &str) -> Result<String, AgentError> {
        Ok(self.select_for(query))
    }
}
