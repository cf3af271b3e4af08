//! Favorites storage and last-content recording
//!
//! Saving is two explicit steps: every delivered content item is recorded
//! per user in [`RecentContent`], and only a deliberate "save" action moves
//! the recorded item into a [`FavoritesStore`]. The store is a
//! trait so anything durable can slot in later; the shipped implementation
//! keeps everything in process memory.

use crate::content::ContentKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors produced by a favorites store
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The backing store rejected the operation
    #[error("favorites storage error: {0}")]
    Storage(String),
}

/// A single saved content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItem {
    /// Unique item id
    pub id: Uuid,
    /// Category the item came from
    pub kind: ContentKind,
    /// The content text as it was delivered
    pub text: String,
    /// When the item was saved
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    /// Creates an item stamped with the current time
    #[must_use]
    pub fn new(kind: ContentKind, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text,
            saved_at: Utc::now(),
        }
    }
}

/// Last delivered content item per user
///
/// Overwritten on every delivery; consumed by the save action.
#[derive(Default)]
pub struct RecentContent {
    items: RwLock<HashMap<i64, (ContentKind, String)>>,
}

impl RecentContent {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the last delivered item for a user
    pub async fn remember(&self, user_id: i64, kind: ContentKind, text: String) {
        self.items.write().await.insert(user_id, (kind, text));
    }

    /// Returns the last delivered item for a user, if any
    pub async fn last(&self, user_id: i64) -> Option<(ContentKind, String)> {
        self.items.read().await.get(&user_id).cloned()
    }
}

/// Storage seam for a user's saved items
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Appends an item to the user's favorites
    async fn add(&self, user_id: i64, item: SavedItem) -> Result<(), FavoritesError>;

    /// Lists the user's favorites, oldest first
    async fn list(&self, user_id: i64) -> Result<Vec<SavedItem>, FavoritesError>;
}

/// Process-memory favorites store, lost on restart
#[derive(Default)]
pub struct InMemoryFavorites {
    items: RwLock<HashMap<i64, Vec<SavedItem>>>,
}

impl InMemoryFavorites {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for InMemoryFavorites {
    async fn add(&self, user_id: i64, item: SavedItem) -> Result<(), FavoritesError> {
        self.items.write().await.entry(user_id).or_default().push(item);
        Ok(())
    }

    async fn list(&self, user_id: i64) -> Result<Vec<SavedItem>, FavoritesError> {
        Ok(self
            .items
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remember_overwrites_previous() {
        let recent = RecentContent::new();

        recent
            .remember(1, ContentKind::Joke, "first".to_string())
            .await;
        recent
            .remember(1, ContentKind::CatFact, "second".to_string())
            .await;

        let last = recent.last(1).await;
        assert_eq!(last, Some((ContentKind::CatFact, "second".to_string())));
    }

    #[tokio::test]
    async fn test_last_is_per_user() {
        let recent = RecentContent::new();

        recent
            .remember(1, ContentKind::Joke, "joke".to_string())
            .await;

        assert!(recent.last(2).await.is_none());
    }

    #[tokio::test]
    async fn test_add_and_list_keeps_order() -> Result<(), FavoritesError> {
        let store = InMemoryFavorites::new();

        store
            .add(1, SavedItem::new(ContentKind::Joke, "a".to_string()))
            .await?;
        store
            .add(1, SavedItem::new(ContentKind::CatFact, "b".to_string()))
            .await?;

        let items = store.list(1).await?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "a");
        assert_eq!(items[1].text, "b");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_empty() -> Result<(), FavoritesError> {
        let store = InMemoryFavorites::new();
        assert!(store.list(42).await?.is_empty());
        Ok(())
    }
}
