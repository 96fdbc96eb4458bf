use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, User};
use crate::store::{TaskStore, UserStore};

/// In-memory implementation of the store contracts.
///
/// Backs the integration tests and local experiments; records live in plain
/// `Vec`s so creation order falls out of insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    tasks: Mutex<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the data is still usable.
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(AppError::NotFound("User not found".into())),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        self.tasks().push(task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.tasks().iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        Ok(self
            .tasks()
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, task: Task) -> Result<Task, AppError> {
        let mut tasks = self.tasks();
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(task)
            }
            None => Err(AppError::NotFound("Task not found".into())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateTaskRequest;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn task_for(owner: Uuid, title: &str) -> Task {
        Task::new(
            CreateTaskRequest {
                title: title.to_string(),
                description: None,
                priority: None,
                due_date: Utc::now().date_naive(),
                completed: false,
            },
            owner,
        )
    }

    #[actix_rt::test]
    async fn test_user_insert_and_lookup() {
        let store = MemoryStore::new();
        let user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        let inserted = UserStore::insert(&store, user.clone()).await.unwrap();
        assert_eq!(inserted.id, user.id);

        let by_id = UserStore::find_by_id(&store, user.id).await.unwrap();
        assert!(by_id.is_some());
        let by_email = store.find_by_email("alice@example.com").await.unwrap();
        assert!(by_email.is_some());
        let missing = store.find_by_email("bob@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[actix_rt::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        UserStore::insert(&store, user).await.unwrap();

        let dup = User::new(
            "Other Alice".to_string(),
            "alice@example.com".to_string(),
            "hash2".to_string(),
        );
        assert!(matches!(
            UserStore::insert(&store, dup).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_tasks_listed_in_creation_order_per_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for title in ["first", "second", "third"] {
            TaskStore::insert(&store, task_for(alice, title))
                .await
                .unwrap();
        }
        TaskStore::insert(&store, task_for(bob, "bob task"))
            .await
            .unwrap();

        let listed = store.find_by_owner(alice).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);

        let bobs = store.find_by_owner(bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
    }

    #[actix_rt::test]
    async fn test_delete_reports_whether_record_existed() {
        let store = MemoryStore::new();
        let task = task_for(Uuid::new_v4(), "doomed");
        let id = task.id;
        TaskStore::insert(&store, task).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
    }
}
