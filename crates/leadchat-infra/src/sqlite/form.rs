//! SQLite form repository implementation.
//!
//! The lead magnet is stored inline in the `forms` row. Slug uniqueness
//! among published forms is enforced by a partial unique index.

use leadchat_core::repository::form::FormRepository;
use leadchat_types::error::RepositoryError;
use leadchat_types::form::{FormDefinition, FormId, LeadMagnet, LeadMagnetKind};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use super::{SqliteStore, format_datetime, parse_datetime};

const FORM_COLUMNS: &str = "id, title, slug, welcome_message, name_label, email_label, \
     custom_question, thank_you_message, magnet_id, magnet_title, magnet_description, \
     magnet_kind, magnet_url, magnet_cover_image, published, view_count, conversion_count, \
     created_at";

/// Internal row type for mapping SQLite rows to a domain FormDefinition.
struct FormRow {
    id: String,
    title: String,
    slug: String,
    welcome_message: String,
    name_label: String,
    email_label: String,
    custom_question: Option<String>,
    thank_you_message: String,
    magnet_id: String,
    magnet_title: String,
    magnet_description: String,
    magnet_kind: String,
    magnet_url: String,
    magnet_cover_image: Option<String>,
    published: bool,
    view_count: i64,
    conversion_count: i64,
    created_at: String,
}

impl FormRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            welcome_message: row.try_get("welcome_message")?,
            name_label: row.try_get("name_label")?,
            email_label: row.try_get("email_label")?,
            custom_question: row.try_get("custom_question")?,
            thank_you_message: row.try_get("thank_you_message")?,
            magnet_id: row.try_get("magnet_id")?,
            magnet_title: row.try_get("magnet_title")?,
            magnet_description: row.try_get("magnet_description")?,
            magnet_kind: row.try_get("magnet_kind")?,
            magnet_url: row.try_get("magnet_url")?,
            magnet_cover_image: row.try_get("magnet_cover_image")?,
            published: row.try_get("published")?,
            view_count: row.try_get("view_count")?,
            conversion_count: row.try_get("conversion_count")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_form(self) -> Result<FormDefinition, RepositoryError> {
        let id = self
            .id
            .parse::<FormId>()
            .map_err(|e| RepositoryError::Query(format!("invalid form id: {e}")))?;

        let magnet_id = self
            .magnet_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid magnet id: {e}")))?;

        let kind: LeadMagnetKind = self
            .magnet_kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(FormDefinition {
            id,
            title: self.title,
            slug: self.slug,
            welcome_message: self.welcome_message,
            name_label: self.name_label,
            email_label: self.email_label,
            custom_question: self.custom_question,
            thank_you_message: self.thank_you_message,
            lead_magnet: LeadMagnet {
                id: magnet_id,
                title: self.magnet_title,
                description: self.magnet_description,
                kind,
                url: self.magnet_url,
                cover_image: self.magnet_cover_image,
            },
            published: self.published,
            view_count: self.view_count,
            conversion_count: self.conversion_count,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_rows(rows: &[SqliteRow]) -> Result<Vec<FormDefinition>, RepositoryError> {
    rows.iter()
        .map(|row| {
            FormRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_form()
        })
        .collect()
}

/// Translate a write error, naming the slug when the published-slug index fired.
fn map_write_error(err: sqlx::Error, slug: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) if db_err.message().contains("forms.slug") => {
            RepositoryError::Conflict(slug.to_string())
        }
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
            RepositoryError::Conflict(db_err.message().to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

async fn fetch_form(
    pool: &SqlitePool,
    id: &FormId,
) -> Result<Option<FormDefinition>, RepositoryError> {
    let row = sqlx::query(&format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    match row {
        Some(row) => {
            let form_row =
                FormRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(form_row.into_form()?))
        }
        None => Ok(None),
    }
}

impl FormRepository for SqliteStore {
    async fn create(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let magnet = &form.lead_magnet;
        sqlx::query(&format!(
            "INSERT INTO forms ({FORM_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(form.id.to_string())
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&form.welcome_message)
        .bind(&form.name_label)
        .bind(&form.email_label)
        .bind(&form.custom_question)
        .bind(&form.thank_you_message)
        .bind(magnet.id.to_string())
        .bind(&magnet.title)
        .bind(&magnet.description)
        .bind(magnet.kind.to_string())
        .bind(&magnet.url)
        .bind(&magnet.cover_image)
        .bind(form.published)
        .bind(form.view_count)
        .bind(form.conversion_count)
        .bind(format_datetime(&form.created_at))
        .execute(&self.pool().writer)
        .await
        .map_err(|e| map_write_error(e, &form.slug))?;

        Ok(form.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        fetch_form(&self.pool().reader, id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<FormDefinition>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE slug = ? ORDER BY published DESC, id ASC LIMIT 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool().reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let form_row =
                    FormRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(form_row.into_form()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {FORM_COLUMNS} FROM forms ORDER BY id ASC"))
            .fetch_all(&self.pool().reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn update(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let magnet = &form.lead_magnet;
        let result = sqlx::query(
            "UPDATE forms SET title = ?, slug = ?, welcome_message = ?, name_label = ?,
                email_label = ?, custom_question = ?, thank_you_message = ?, magnet_id = ?,
                magnet_title = ?, magnet_description = ?, magnet_kind = ?, magnet_url = ?,
                magnet_cover_image = ?, published = ?
             WHERE id = ?",
        )
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&form.welcome_message)
        .bind(&form.name_label)
        .bind(&form.email_label)
        .bind(&form.custom_question)
        .bind(&form.thank_you_message)
        .bind(magnet.id.to_string())
        .bind(&magnet.title)
        .bind(&magnet.description)
        .bind(magnet.kind.to_string())
        .bind(&magnet.url)
        .bind(&magnet.cover_image)
        .bind(form.published)
        .bind(form.id.to_string())
        .execute(&self.pool().writer)
        .await
        .map_err(|e| map_write_error(e, &form.slug))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        fetch_form(&self.pool().writer, &form.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool().writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: &FormId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE forms SET view_count = view_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool().writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        debug!(form_id = %id, "view counted");
        Ok(())
    }
}
