//! PostgreSQL backend. Tables live in one schema (`PORTFOLIO_SCHEMA`, default `portfolio`).

use super::Storage;
use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::model::{AdminSetting, Gallery, GalleryPatch, NewGallery, NewPhoto, Photo, PhotoPatch};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const GALLERY_COLUMNS: &str = r#"id, name, slug, description, hero_image, "order", created_at"#;
const PHOTO_COLUMNS: &str = r#"id, gallery_id, filename, original_name, url, "order", created_at"#;
const SETTING_COLUMNS: &str = "id, key, value, updated_at";

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
    schema: String,
}

impl PgStorage {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStorage {
            pool,
            schema: schema.into(),
        }
    }

    /// Schema-qualified table name (e.g. "portfolio.galleries").
    fn table(&self, name: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), name)
    }

    /// Create the schema and tables if they do not exist. Photos reference galleries with
    /// `ON DELETE CASCADE`; setting keys and gallery slugs are unique.
    pub async fn ensure_tables(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;

        let galleries = self.table("galleries");
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                hero_image TEXT,
                "order" BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            galleries
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        let photos = self.table("photos");
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                gallery_id TEXT NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                filename TEXT NOT NULL,
                original_name TEXT NOT NULL,
                url TEXT NOT NULL,
                "order" BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            photos, galleries
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        let index = format!(
            "CREATE INDEX IF NOT EXISTS photos_gallery_id_idx ON {} (gallery_id)",
            photos
        );
        sqlx::query(&index).execute(&self.pool).await?;

        let settings = self.table("admin_settings");
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                value TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            settings
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn map_write_error(err: sqlx::Error, slug: Option<&str>) -> AppError {
    if is_unique_violation(&err) {
        return AppError::Conflict(format!("gallery slug already exists: {}", slug.unwrap_or_default()));
    }
    if is_foreign_key_violation(&err) {
        return AppError::Validation("gallery does not exist".into());
    }
    AppError::Db(err)
}

#[async_trait]
impl Storage for PgStorage {
    async fn list_galleries(&self) -> Result<Vec<Gallery>, AppError> {
        let sql = format!(
            r#"SELECT {} FROM {} ORDER BY "order", created_at, id"#,
            GALLERY_COLUMNS,
            self.table("galleries")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Gallery>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_gallery(&self, id: &str) -> Result<Option<Gallery>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", GALLERY_COLUMNS, self.table("galleries"));
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as::<_, Gallery>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn get_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE slug = $1", GALLERY_COLUMNS, self.table("galleries"));
        tracing::debug!(sql = %sql, slug, "query");
        Ok(sqlx::query_as::<_, Gallery>(&sql).bind(slug).fetch_optional(&self.pool).await?)
    }

    async fn create_gallery(&self, gallery: NewGallery) -> Result<Gallery, AppError> {
        let sql = format!(
            r#"INSERT INTO {} (id, name, slug, description, "order") VALUES ($1, $2, $3, $4, $5) RETURNING {}"#,
            self.table("galleries"),
            GALLERY_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        sqlx::query_as::<_, Gallery>(&sql)
            .bind(new_id())
            .bind(&gallery.name)
            .bind(&gallery.slug)
            .bind(&gallery.description)
            .bind(gallery.order.unwrap_or(0))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(&gallery.slug)))
    }

    async fn update_gallery(&self, id: &str, patch: GalleryPatch) -> Result<Option<Gallery>, AppError> {
        let table = self.table("galleries");
        let mut tx = self.pool.begin().await?;
        let select = format!("SELECT {} FROM {} WHERE id = $1 FOR UPDATE", GALLERY_COLUMNS, table);
        let Some(mut gallery) = sqlx::query_as::<_, Gallery>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        patch.apply(&mut gallery);
        let update = format!(
            r#"UPDATE {} SET name = $2, slug = $3, description = $4, hero_image = $5, "order" = $6 WHERE id = $1 RETURNING {}"#,
            table, GALLERY_COLUMNS
        );
        tracing::debug!(sql = %update, id, "query (tx)");
        let updated = sqlx::query_as::<_, Gallery>(&update)
            .bind(id)
            .bind(&gallery.name)
            .bind(&gallery.slug)
            .bind(&gallery.description)
            .bind(&gallery.hero_image)
            .bind(gallery.order)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, Some(&gallery.slug)))?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn reorder_galleries(&self, ids: &[String]) -> Result<(), AppError> {
        let sql = format!(r#"UPDATE {} SET "order" = $1 WHERE id = $2"#, self.table("galleries"));
        tracing::debug!(sql = %sql, count = ids.len(), "reorder (tx)");
        let mut tx = self.pool.begin().await?;
        for (position, id) in ids.iter().enumerate() {
            sqlx::query(&sql)
                .bind(position as i64)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_gallery(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {} WHERE gallery_id = $1", self.table("photos")))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table("galleries")))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_photos_by_gallery(&self, gallery_id: &str) -> Result<Vec<Photo>, AppError> {
        let sql = format!(
            r#"SELECT {} FROM {} WHERE gallery_id = $1 ORDER BY "order", created_at, id"#,
            PHOTO_COLUMNS,
            self.table("photos")
        );
        tracing::debug!(sql = %sql, gallery_id, "query");
        Ok(sqlx::query_as::<_, Photo>(&sql).bind(gallery_id).fetch_all(&self.pool).await?)
    }

    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", PHOTO_COLUMNS, self.table("photos"));
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as::<_, Photo>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, AppError> {
        let sql = format!(
            r#"INSERT INTO {} (id, gallery_id, filename, original_name, url, "order") VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}"#,
            self.table("photos"),
            PHOTO_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        sqlx::query_as::<_, Photo>(&sql)
            .bind(new_id())
            .bind(&photo.gallery_id)
            .bind(&photo.filename)
            .bind(&photo.original_name)
            .bind(&photo.url)
            .bind(photo.order.unwrap_or(0))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))
    }

    async fn update_photo(&self, id: &str, patch: PhotoPatch) -> Result<Option<Photo>, AppError> {
        let table = self.table("photos");
        let mut tx = self.pool.begin().await?;
        let select = format!("SELECT {} FROM {} WHERE id = $1 FOR UPDATE", PHOTO_COLUMNS, table);
        let Some(mut photo) = sqlx::query_as::<_, Photo>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        patch.apply(&mut photo);
        let update = format!(
            r#"UPDATE {} SET gallery_id = $2, original_name = $3, "order" = $4 WHERE id = $1 RETURNING {}"#,
            table, PHOTO_COLUMNS
        );
        tracing::debug!(sql = %update, id, "query (tx)");
        let updated = sqlx::query_as::<_, Photo>(&update)
            .bind(id)
            .bind(&photo.gallery_id)
            .bind(&photo.original_name)
            .bind(photo.order)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, None))?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_photo(&self, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table("photos"));
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_photos(&self, gallery_id: &str, ids: &[String]) -> Result<(), AppError> {
        let sql = format!(
            r#"UPDATE {} SET "order" = $1 WHERE id = $2 AND gallery_id = $3"#,
            self.table("photos")
        );
        tracing::debug!(sql = %sql, gallery_id, count = ids.len(), "reorder (tx)");
        let mut tx = self.pool.begin().await?;
        for (position, id) in ids.iter().enumerate() {
            sqlx::query(&sql)
                .bind(position as i64)
                .bind(id)
                .bind(gallery_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn set_photo_order(&self, id: &str, order: i64) -> Result<bool, AppError> {
        let sql = format!(r#"UPDATE {} SET "order" = $1 WHERE id = $2"#, self.table("photos"));
        tracing::debug!(sql = %sql, id, order, "query");
        let result = sqlx::query(&sql).bind(order).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_admin_setting(&self, key: &str) -> Result<Option<AdminSetting>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE key = $1", SETTING_COLUMNS, self.table("admin_settings"));
        tracing::debug!(sql = %sql, key, "query");
        Ok(sqlx::query_as::<_, AdminSetting>(&sql).bind(key).fetch_optional(&self.pool).await?)
    }

    async fn set_admin_setting(&self, key: &str, value: &str) -> Result<AdminSetting, AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING {}
            "#,
            self.table("admin_settings"),
            SETTING_COLUMNS
        );
        tracing::debug!(sql = %sql, key, "query");
        Ok(sqlx::query_as::<_, AdminSetting>(&sql)
            .bind(new_id())
            .bind(key)
            .bind(value)
            .fetch_one(&self.pool)
            .await?)
    }
}

/// Create the database named in `database_url` when it is missing. The check runs over a
/// connection to the `postgres` maintenance database with the same host and credentials.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (maintenance, target) = maintenance_options(database_url)?;
    let Some(target) = target else {
        return Ok(());
    };
    let mut conn = maintenance.connect().await?;
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&target)
        .fetch_one(&mut conn)
        .await?;
    if found {
        return Ok(());
    }
    sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&target)))
        .execute(&mut conn)
        .await?;
    tracing::info!(database = %target, "created database");
    Ok(())
}

/// Options for the `postgres` database, plus the database the URL targets when that is
/// something other than `postgres` itself.
fn maintenance_options(database_url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let options = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let target = options
        .get_database()
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(str::to_string);
    Ok((options.database("postgres"), target))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
