use serde::{Deserialize, Serialize};

/// Publisher affiliation of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    #[default]
    #[serde(rename = "Marvel")]
    Marvel,
    #[serde(rename = "DC comics")]
    Dc,
}

impl Universe {
    /// Map free publisher text ("Marvel Comics", "DC Comics", ...) onto a universe.
    /// Anything unrecognised lands in Marvel.
    pub fn from_publisher(publisher: &str) -> Self {
        let publisher = publisher.to_lowercase();
        if publisher.contains("marvel") {
            Universe::Marvel
        } else if publisher.contains("dc") {
            Universe::Dc
        } else {
            Universe::Marvel
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Universe::Marvel => "Marvel",
            Universe::Dc => "DC comics",
        }
    }
}

impl std::fmt::Display for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized shape every lookup path is reduced to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    #[serde(rename = "real name", alias = "real_name", default)]
    pub real_name: String,
    pub universe: Universe,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, real_name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            real_name: real_name.into(),
            universe,
        }
    }
}
