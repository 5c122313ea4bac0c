use async_trait::async_trait;
use shared::models::{CharacterRecord, Universe};
use thiserror::Error;

pub mod guard;
pub mod seed;
pub mod sqlite;

pub use seed::{SeedRecord, read_seed};
pub use sqlite::SqliteHeroStore;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Seed file error: {0}")]
    Seed(#[from] csv::Error),
    #[error("Seed file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// One row of the `heroes` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeroRow {
    pub id: i64,
    pub name: String,
    pub alias: Option<String>,
    pub universe: String,
}

impl From<HeroRow> for CharacterRecord {
    fn from(row: HeroRow) -> Self {
        CharacterRecord {
            name: row.name,
            real_name: row.alias.unwrap_or_default(),
            universe: Universe::from_publisher(&row.universe),
        }
    }
}

#[async_trait]
pub trait HeroStore: Send + Sync {
    /// Drop every row and load `seed` in order, assigning ids from 1.
    async fn reload(&self, seed: &[SeedRecord]) -> DbResult<usize>;
    /// Run a read-only retrieval. Anything else fails before execution.
    async fn select(&self, sql: &str) -> DbResult<Vec<HeroRow>>;
}
