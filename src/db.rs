use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::dialogue::{Answer, AnswerValue};

/// Represents one answered question in the database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredResponse {
    pub user_id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub media: Option<Vec<u8>>,
}

/// Open a SQLite pool, creating the database file if needed
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    info!(database_url = %database_url, "Connecting to responses database");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {database_url}"))?
        .create_if_missing(true);

    // An in-memory database only lives as long as its single connection
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("Failed to connect to responses database")
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS responses (
            user_id INTEGER,
            category TEXT,
            question TEXT,
            answer TEXT,
            media BLOB
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create responses table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_responses_user ON responses(user_id)")
        .execute(pool)
        .await
        .context("Failed to create responses index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Insert a single response row
pub async fn save_response(pool: &SqlitePool, response: &StoredResponse) -> Result<()> {
    debug!(user_id = response.user_id, category = %response.category, "Saving response");

    sqlx::query(
        "INSERT INTO responses (user_id, category, question, answer, media)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(response.user_id)
    .bind(&response.category)
    .bind(&response.question)
    .bind(&response.answer)
    .bind(&response.media)
    .execute(pool)
    .await
    .context("Failed to insert response")?;

    Ok(())
}

/// Save every answer of a completed survey in one transaction.
///
/// Media answers carry the stored file's bytes; a file that can no longer be
/// read is saved without its blob.
pub async fn save_survey(
    pool: &SqlitePool,
    user_id: u64,
    category: &str,
    answers: &[Answer],
) -> Result<usize> {
    let mut rows = Vec::with_capacity(answers.len());
    for answer in answers {
        let media = match &answer.value {
            AnswerValue::Text(_) => None,
            AnswerValue::Media { path, .. } => match tokio::fs::read(path).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Media file unreadable, saving answer without blob");
                    None
                }
            },
        };
        rows.push(StoredResponse {
            user_id: user_id as i64,
            category: category.to_string(),
            question: answer.question.clone(),
            answer: answer.value.to_string(),
            media,
        });
    }

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    for row in &rows {
        sqlx::query(
            "INSERT INTO responses (user_id, category, question, answer, media)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(row.user_id)
        .bind(&row.category)
        .bind(&row.question)
        .bind(&row.answer)
        .bind(&row.media)
        .execute(&mut *tx)
        .await
        .context("Failed to insert survey response")?;
    }
    tx.commit().await.context("Failed to commit survey responses")?;

    info!(user_id, category = %category, rows = rows.len(), "Survey responses saved");
    Ok(rows.len())
}

/// All responses of a user, oldest first
pub async fn list_responses_for_user(pool: &SqlitePool, user_id: u64) -> Result<Vec<StoredResponse>> {
    sqlx::query_as::<_, StoredResponse>(
        "SELECT user_id, category, question, answer, media
         FROM responses WHERE user_id = ?1 ORDER BY rowid",
    )
    .bind(user_id as i64)
    .fetch_all(pool)
    .await
    .context("Failed to list responses")
}

pub async fn count_responses(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses")
        .fetch_one(pool)
        .await
        .context("Failed to count responses")?;
    Ok(count.0)
}
