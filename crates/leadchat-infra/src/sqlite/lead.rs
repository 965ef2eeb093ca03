//! SQLite lead repository implementation.

use leadchat_core::repository::lead::LeadRepository;
use leadchat_types::error::RepositoryError;
use leadchat_types::form::FormId;
use leadchat_types::lead::Lead;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::{SqliteStore, format_datetime, parse_datetime};

fn lead_from_row(row: &SqliteRow) -> Result<Lead, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let form_id: String = row
        .try_get("form_id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Lead {
        id: id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid lead id: {e}")))?,
        form_id: form_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid form id: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        custom_answer: row
            .try_get("custom_answer")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl LeadRepository for SqliteStore {
    async fn create(&self, lead: &Lead) -> Result<Lead, RepositoryError> {
        let mut tx = self
            .pool()
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let bumped = sqlx::query(
            "UPDATE forms SET conversion_count = conversion_count + 1 WHERE id = ?",
        )
        .bind(lead.form_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Dropping the transaction rolls it back.
        if bumped.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO leads (id, form_id, name, email, custom_answer, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(lead.id.to_string())
        .bind(lead.form_id.to_string())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.custom_answer)
        .bind(format_datetime(&lead.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(lead.clone())
    }

    async fn list(&self, form_id: Option<&FormId>) -> Result<Vec<Lead>, RepositoryError> {
        let rows = match form_id {
            Some(form_id) => {
                sqlx::query(
                    "SELECT id, form_id, name, email, custom_answer, created_at
                     FROM leads WHERE form_id = ? ORDER BY id ASC",
                )
                .bind(form_id.to_string())
                .fetch_all(&self.pool().reader)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, form_id, name, email, custom_answer, created_at
                     FROM leads ORDER BY id ASC",
                )
                .fetch_all(&self.pool().reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(lead_from_row).collect()
    }
}
