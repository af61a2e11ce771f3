use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use deck_keeper_core::{Card, Deck, DeckId, DrawnCard};

use super::{DeckStore, StoreError};

/// 内存中的牌组存储，进程退出即丢失
///
/// 每次写入都在 DashMap 的分片锁内完成，对单副牌是原子的。
#[derive(Default)]
pub struct MemoryDeckStore {
    decks: DashMap<DeckId, Deck>,
}

impl MemoryDeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.decks.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }
}

#[async_trait]
impl DeckStore for MemoryDeckStore {
    async fn create(&self, id: DeckId, full: &[Card]) -> Result<(), StoreError> {
        match self.decks.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey),
            Entry::Vacant(slot) => {
                slot.insert(Deck::new(id, full.to_vec()));
                Ok(())
            }
        }
    }

    async fn get(&self, id: DeckId) -> Result<Deck, StoreError> {
        self.decks
            .get(&id)
            .map(|deck| deck.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn update_upcoming(&self, id: DeckId, upcoming: &[Card]) -> Result<(), StoreError> {
        let mut deck = self.decks.get_mut(&id).ok_or(StoreError::NotFound)?;
        deck.upcoming = upcoming.to_vec();
        Ok(())
    }

    async fn update_drawn_and_upcoming(
        &self,
        id: DeckId,
        drawn: &[DrawnCard],
        upcoming: &[Card],
    ) -> Result<(), StoreError> {
        let mut deck = self.decks.get_mut(&id).ok_or(StoreError::NotFound)?;
        deck.drawn = drawn.to_vec();
        deck.upcoming = upcoming.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_keeper_core::generate;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryDeckStore::new();
        let id = Uuid::new_v4();
        let full = generate(1, true).unwrap();
        store.create(id, &full).await.unwrap();

        let deck = store.get(id).await.unwrap();
        assert_eq!(deck.full, full);
        assert_eq!(deck.upcoming, full);
        assert!(deck.drawn.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_and_missing() {
        let store = MemoryDeckStore::new();
        let id = Uuid::new_v4();
        store.create(id, &[]).await.unwrap();
        assert!(matches!(store.create(id, &[]).await, Err(StoreError::DuplicateKey)));

        let missing = Uuid::new_v4();
        assert!(matches!(store.get(missing).await, Err(StoreError::NotFound)));
        assert!(matches!(store.update_upcoming(missing, &[]).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_updates_replace_piles() {
        let store = MemoryDeckStore::new();
        let id = Uuid::new_v4();
        let full = generate(1, false).unwrap();
        store.create(id, &full).await.unwrap();

        let drawn = vec![DrawnCard { code: "2h".into(), time: "2024-01-01T00:00:00Z".into() }];
        store.update_drawn_and_upcoming(id, &drawn, &full[1..]).await.unwrap();
        let deck = store.get(id).await.unwrap();
        assert_eq!(deck.drawn, drawn);
        assert_eq!(deck.upcoming.len(), 51);

        store.update_upcoming(id, &full[..3]).await.unwrap();
        let deck = store.get(id).await.unwrap();
        assert_eq!(deck.upcoming, full[..3].to_vec());
        assert_eq!(deck.drawn, drawn);
        assert_eq!(deck.full, full);
    }
}
