use crate::dbs::{DbResult, HeroRow, HeroStore, SeedRecord, guard};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed hero table. Every call opens its own connection and closes it
/// before returning; nothing is pooled between requests.
#[derive(Clone, Debug)]
pub struct SqliteHeroStore {
    path: PathBuf,
}

impl SqliteHeroStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self, read_only: bool) -> DbResult<SqliteConnection> {
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(!read_only)
            .read_only(read_only)
            .journal_mode(SqliteJournalMode::Delete)
            .connect()
            .await?;
        Ok(conn)
    }
}

/// Projections may leave out `id`, `alias` or `universe`; a column that is
/// present but cannot be decoded is still an error.
fn optional_column<'r, T>(row: &'r SqliteRow, column: &str) -> DbResult<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    match row.try_get::<Option<T>, _>(column) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_row(row: &SqliteRow) -> DbResult<HeroRow> {
    Ok(HeroRow {
        id: optional_column(row, "id")?.unwrap_or_default(),
        name: row.try_get("name")?,
        alias: optional_column(row, "alias")?,
        universe: optional_column(row, "universe")?.unwrap_or_default(),
    })
}

#[async_trait]
impl HeroStore for SqliteHeroStore {
    async fn reload(&self, seed: &[SeedRecord]) -> DbResult<usize> {
        let mut conn = self.connect(false).await?;
        let mut tx = conn.begin().await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS heroes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                alias TEXT,
                universe TEXT NOT NULL
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM heroes").execute(&mut *tx).await?;

        for (idx, hero) in seed.iter().enumerate() {
            sqlx::query("INSERT INTO heroes (id, name, alias, universe) VALUES (?, ?, ?, ?)")
                .bind(idx as i64 + 1)
                .bind(&hero.name)
                .bind(hero.alias())
                .bind(&hero.universe)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM heroes")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;

        info!("Loaded {} heroes into {}", count, self.path.display());
        Ok(count as usize)
    }

    async fn select(&self, sql: &str) -> DbResult<Vec<HeroRow>> {
        let sql = guard::validate_select(sql)?;

        let mut conn = self.connect(true).await?;
        let rows = sqlx::query(sql).fetch_all(&mut conn).await;
        conn.close().await?;

        let heroes = rows?.iter().map(map_row).collect::<DbResult<Vec<_>>>()?;
        debug!("Query returned {} rows", heroes.len());
        Ok(heroes)
    }
}
