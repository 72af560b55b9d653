//! In-process user store for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repositories::{UserStore, DUPLICATE_EMAIL};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UserRecord};

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, UserRecord>,
    /// email -> id
    by_email: HashMap<String, Uuid>,
}

/// Keeps users in memory. All writes go through one lock, so the
/// email-uniqueness check and the insert happen as a single step.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Users>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.by_email.contains_key(&user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let record = user.into_record();
        users.by_email.insert(record.email.clone(), record.id);
        users.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.by_id.remove(&id) {
            Some(record) => {
                users.by_email.remove(&record.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn insert_and_lookup() {
        let store = MemoryUserStore::new();
        let created = store.insert(NewUser::new("a@x.com", "h")).await.unwrap();
        assert_eq!(
            store.find_by_email("a@x.com").await.unwrap().unwrap().id,
            created.id
        );
        assert_eq!(
            store.find_by_id(created.id).await.unwrap().unwrap().email,
            "a@x.com"
        );
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.insert(NewUser::new("a@x.com", "h")).await.unwrap();
        let err = store.insert(NewUser::new("a@x.com", "h2")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(MemoryUserStore::new());
        let tasks = (0..32).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(NewUser::new("race@x.com", "h")).await })
        });
        let results = futures::future::join_all(tasks).await;
        let ok = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_frees_the_email() {
        let store = MemoryUserStore::new();
        let created = store.insert(NewUser::new("a@x.com", "h")).await.unwrap();
        assert!(store.remove(created.id).await.unwrap());
        assert!(!store.remove(created.id).await.unwrap());
        assert!(store.is_empty().await);
        store.insert(NewUser::new("a@x.com", "h")).await.unwrap();
    }
}
