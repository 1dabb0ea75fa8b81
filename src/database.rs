// src/database.rs
//! SQLite-backed user administration. The dashboard's user list lives here,
//! behind a repository/service pair; nothing else in the service persists
//! locally (jobs and applicants are fetched from upstream per request).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const USER_ROLES: &[&str] = &["admin", "manager", "user"];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup.
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== User Model =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

// ===== User Repository =====

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            ORDER BY name ASC, email ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn create(&self, name: &str, email: &str, role: &str) -> Result<User> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!("Created user {} ({})", email, role);

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update(&self, id: &str, patch: &UserPatch) -> Result<Option<User>> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let name = patch.name.clone().unwrap_or(existing.name);
        let email = patch.email.clone().unwrap_or(existing.email);
        let role = patch.role.clone().unwrap_or(existing.role);
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&email)
        .bind(&role)
        .bind(now)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(Some(User {
            id: existing.id,
            name,
            email,
            role,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted user: {}", id);
        }

        Ok(deleted)
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ===== User Service =====

pub struct UserService<'a> {
    repo: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            repo: UserRepository::new(pool),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.repo.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.repo.find_by_id(id).await
    }

    /// Create a user after validating the role label and email uniqueness.
    pub async fn create(&self, name: &str, email: &str, role: &str) -> Result<User> {
        let role = normalize_role(role)?;

        if name.trim().is_empty() {
            anyhow::bail!("User name must not be empty");
        }
        if !email.contains('@') {
            anyhow::bail!("Invalid email address: {}", email);
        }
        if self.repo.find_by_email(email).await?.is_some() {
            anyhow::bail!("A user with email {} already exists", email);
        }

        self.repo.create(name.trim(), email, &role).await
    }

    pub async fn update(&self, id: &str, patch: &UserPatch) -> Result<Option<User>> {
        let patch = UserPatch {
            name: patch.name.clone(),
            email: patch.email.clone(),
            role: match &patch.role {
                Some(role) => Some(normalize_role(role)?),
                None => None,
            },
        };

        if let Some(email) = &patch.email {
            if let Some(other) = self.repo.find_by_email(email).await? {
                if other.id != id {
                    anyhow::bail!("A user with email {} already exists", email);
                }
            }
        }

        self.repo.update(id, &patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.repo.delete(id).await
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<bool> {
        self.repo.delete_by_email(email).await
    }
}

/// Role labels form a small closed set; matching is case-insensitive and the
/// stored label is lowercase.
pub fn normalize_role(role: &str) -> Result<String> {
    let normalized = role.trim().to_lowercase();
    if USER_ROLES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        anyhow::bail!(
            "Unknown role: {}. Expected one of: {}",
            role,
            USER_ROLES.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_normalization_accepts_known_labels() {
        assert_eq!(normalize_role("Admin").unwrap(), "admin");
        assert_eq!(normalize_role(" manager ").unwrap(), "manager");
        assert!(normalize_role("root").is_err());
    }
}
