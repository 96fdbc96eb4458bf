use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, User};
use crate::store::{TaskStore, UserStore};

/// Postgres-backed implementation of the store contracts.
///
/// Schema: see `schema.sql`. Users carry a unique index on email; tasks carry
/// a secondary index on `owner_id` for per-user listing.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps unique-index violations to a conflict instead of a generic store error.
fn map_insert_error(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Conflict("Email already registered".into())
        }
        _ => AppError::from(error),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: User) -> Result<User, AppError> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, avatar, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, email, password_hash, avatar, created_at",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, avatar = $5
             WHERE id = $1
             RETURNING id, name, email, password_hash, avatar, created_at",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(updated)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let inserted = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, owner_id, title, description, priority, due_date,
                                completed, revision, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id, owner_id, title, description, priority, due_date,
                       completed, revision, created_at, updated_at",
        )
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.revision)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, owner_id, title, description, priority, due_date,
                    completed, revision, created_at, updated_at
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, owner_id, title, description, priority, due_date,
                    completed, revision, created_at, updated_at
             FROM tasks WHERE owner_id = $1
             ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn update(&self, task: Task) -> Result<Task, AppError> {
        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $2, description = $3, priority = $4, due_date = $5,
                 completed = $6, revision = $7, updated_at = $8
             WHERE id = $1
             RETURNING id, owner_id, title, description, priority, due_date,
                       completed, revision, created_at, updated_at",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.revision)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
