//! End-to-end favorites flow through the public seams: deliver (remember) →
//! save → list, plus saving with nothing recorded.

use anyhow::Result;
use funfacts_bot::content::ContentKind;
use funfacts_bot::favorites::{FavoritesStore, InMemoryFavorites, RecentContent, SavedItem};

#[tokio::test]
async fn remember_then_save_then_list_round_trips() -> Result<()> {
    let recent = RecentContent::new();
    let store = InMemoryFavorites::new();
    let user_id = 42;

    // Delivery records the item
    recent
        .remember(user_id, ContentKind::Joke, "setup\n\npunchline".to_string())
        .await;

    // The save action moves the recorded item into the store
    let (kind, text) = recent
        .last(user_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("no recorded content"))?;
    store.add(user_id, SavedItem::new(kind, text)).await?;

    let items = store.list(user_id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ContentKind::Joke);
    assert_eq!(items[0].text, "setup\n\npunchline");
    Ok(())
}

#[tokio::test]
async fn saving_without_recorded_content_is_a_noop() -> Result<()> {
    let recent = RecentContent::new();
    let store = InMemoryFavorites::new();

    assert!(recent.last(42).await.is_none());
    assert!(store.list(42).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn repeated_saves_accumulate_in_order() -> Result<()> {
    let store = InMemoryFavorites::new();
    let user_id = 7;

    for text in ["first", "second", "third"] {
        store
            .add(user_id, SavedItem::new(ContentKind::CatFact, text.to_string()))
            .await?;
    }

    let items = store.list(user_id).await?;
    let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
    Ok(())
}

#[tokio::test]
async fn favorites_are_scoped_per_user() -> Result<()> {
    let store = InMemoryFavorites::new();

    store
        .add(1, SavedItem::new(ContentKind::RandomFact, "fact".to_string()))
        .await?;

    assert!(store.list(2).await?.is_empty());
    assert_eq!(store.list(1).await?.len(), 1);
    Ok(())
}
