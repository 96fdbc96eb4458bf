//!
//! # Persistence Contracts
//!
//! The API depends on these traits rather than on a concrete database. The
//! durable store is a collaborator behind the interface: [`PgStore`] backs the
//! running service, while [`MemoryStore`] backs the test suite and local
//! experiments without a database.
//!
//! Ownership and validation rules live above this layer; implementations only
//! move records. Each operation is individually atomic (single record), and no
//! operation spans more than one task record, so no transaction contract is
//! needed here.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence contract for user accounts. Email lookups are exact matches on
/// the normalized (lowercase) address; uniqueness is checked at the service
/// boundary and enforced again by the store's unique index.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Replaces the stored record with `user`, matched by id.
    async fn update(&self, user: User) -> Result<User, AppError>;
}

/// Persistence contract for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<Task, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    /// All tasks owned by `owner_id`, in creation order.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError>;
    /// Replaces the stored record with `task`, matched by id.
    async fn update(&self, task: Task) -> Result<Task, AppError>;
    /// Removes the task. Returns whether a record was actually deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
