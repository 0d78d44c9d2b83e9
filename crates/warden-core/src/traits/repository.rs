use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Minimal view of a stored user account as returned by the external
/// user repository. Credential material never crosses this boundary;
/// password verification happens entirely on the repository side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Pluggable user repository. The identity core never compares
/// credentials itself; it only consumes this trait to resolve subjects.
/// The concrete implementation (directory, relational backend, ...) is
/// injected at startup time.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by email address.
    ///
    /// # Returns
    /// * `Ok(Some(user))` if the user exists.
    /// * `Ok(None)` if no user has this email.
    /// * `Err(e)` if an internal error occurred.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserSummary>>;

    /// Look up a user by subject id.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserSummary>>;

    /// Apply an opaque patch to a user record.
    ///
    /// # Returns
    /// * `Ok(true)` if a record was updated, `Ok(false)` if none matched.
    async fn update_by_id(&self, id: &str, changes: serde_json::Value) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubRepository {
        users: Mutex<HashMap<String, UserSummary>>,
    }

    #[async_trait]
    impl UserRepository for StubRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserSummary>> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<UserSummary>> {
            let users = self.users.lock().unwrap();
            Ok(users.get(id).cloned())
        }

        async fn update_by_id(&self, id: &str, changes: serde_json::Value) -> Result<bool> {
            let mut users = self.users.lock().unwrap();
            match users.get_mut(id) {
                Some(user) => {
                    if let Some(role) = changes.get("role").and_then(|v| v.as_str()) {
                        user.role = role.to_string();
                    }
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn repository() -> StubRepository {
        let mut users = HashMap::new();
        users.insert(
            "u1".to_string(),
            UserSummary {
                id: "u1".to_string(),
                email: "user@example.com".to_string(),
                role: "user".to_string(),
            },
        );
        StubRepository {
            users: Mutex::new(users),
        }
    }

    #[tokio::test]
    async fn test_find_and_update() {
        let repo = repository();

        let user = repo.find_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert!(repo.find_by_email("missing@example.com").await.unwrap().is_none());

        assert!(repo
            .update_by_id("u1", serde_json::json!({ "role": "moderator" }))
            .await
            .unwrap());
        let user = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(user.role, "moderator");

        assert!(!repo
            .update_by_id("missing", serde_json::json!({}))
            .await
            .unwrap());
    }
}
