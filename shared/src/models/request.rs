use serde::{Deserialize, Serialize};

/// Query string of `GET /heroes`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct HeroQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// Body returned with every non-200 response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
