// User persistence seam

use crate::blog::User;
use async_trait::async_trait;
use quire_core::Error;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, oldest first.
    async fn find_all(&self) -> Result<Vec<User>, Error>;

    async fn find(&self, id: &str) -> Result<Option<User>, Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Insert or replace by id.
    async fn save(&self, user: User) -> Result<User, Error>;
}

/// Process-local user store
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, Error> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
        Ok(users)
    }

    async fn find(&self, id: &str) -> Result<Option<User>, Error> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn save(&self, user: User) -> Result<User, Error> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(user)
    }
}

static REPOSITORY: OnceLock<Arc<dyn UserRepository>> = OnceLock::new();

/// Install the repository the handlers use. Only the first call wins.
pub fn install(repository: Arc<dyn UserRepository>) -> Result<(), Error> {
    REPOSITORY
        .set(repository)
        .map_err(|_| Error::Internal("user repository is already installed".to_string()))
}

/// Installed repository, or an empty in-memory one when none was installed.
pub fn repository() -> Arc<dyn UserRepository> {
    REPOSITORY
        .get_or_init(|| Arc::new(InMemoryUserRepository::new()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .save(User::new("Test", "test@example.com"))
            .await
            .unwrap();

        assert_eq!(repo.find(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_email("TEST@example.com").await.unwrap(),
            Some(user.clone())
        );
        assert!(repo.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.save(User::new("Test", "t@example.com")).await.unwrap();
        user.name = "Renamed".to_string();
        repo.save(user).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
    }

    #[tokio::test]
    async fn test_find_all_oldest_first() {
        let mut older = User::new("Old", "old@example.com");
        older.created_at = 1.0;
        let mut newer = User::new("New", "new@example.com");
        newer.created_at = 2.0;

        let repo = InMemoryUserRepository::with_users([newer, older]);
        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Old", "New"]);
    }
}
