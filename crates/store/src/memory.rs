//! In-memory token store backed by an `Option` behind a `Mutex`.

use async_trait::async_trait;
use remilk_types::{AuthToken, TokenStore, traits::Result};
use std::sync::Mutex;

/// An in-memory [`TokenStore`] implementation for testing and ephemeral use.
pub struct InMemoryTokenStore {
    /// The single stored record, if any.
    data: Mutex<Option<AuthToken>>,
}

impl InMemoryTokenStore {
    /// Creates a new empty in-memory token store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(None),
        }
    }

    /// Creates a store pre-seeded with a record, for tests.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            data: Mutex::new(Some(token)),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    /// Loads the stored record, if present.
    async fn load(&self) -> Result<Option<AuthToken>> {
        Ok(self.data.lock().unwrap().clone())
    }

    /// Saves (or overwrites) the record.
    async fn save(&self, token: &AuthToken) -> Result<()> {
        *self.data.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    /// Removes the record.
    async fn delete(&self) -> Result<()> {
        *self.data.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryTokenStore::new();
        let token = AuthToken::new("tok", "delete", "u1", "alice");
        store.save(&token).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, token);
    }

    #[tokio::test]
    async fn test_load_empty() {
        let store = InMemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryTokenStore::with_token(AuthToken::new("t", "read", "u", "n"));
        store.delete().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_empty_is_ok() {
        let store = InMemoryTokenStore::new();
        assert!(store.delete().await.is_ok());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let store = InMemoryTokenStore::new();
        store
            .save(&AuthToken::new("first", "read", "u", "n"))
            .await
            .unwrap();
        store
            .save(&AuthToken::new("second", "delete", "u", "n"))
            .await
            .unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.token, "second");
    }
}
