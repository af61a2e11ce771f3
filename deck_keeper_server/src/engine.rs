use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use uuid::Uuid;

use deck_keeper_core::{
    generate, parse_card_codes, parse_show_count, Card, DeckError, DeckId, DeckView, DrawOutcome,
    DrawnCard,
};

use crate::store::DeckStore;

/// 牌组操作引擎
///
/// 每个操作都是一次 "读取 -> 状态转移 -> 写回"。
/// 引擎本身不做并发控制，调用方 (`DeckService`) 保证同一时刻只有一个操作在执行。
pub struct DeckEngine<S> {
    store: S,
}

impl<S: DeckStore> DeckEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// 创建新牌组并立即持久化
    pub async fn create(&self, packs: u32, jokers: bool) -> Result<DeckView, DeckError> {
        let cards = generate(packs, jokers)?;
        let deck_id = Uuid::new_v4();
        self.store.create(deck_id, &cards).await?;

        info!("创建了新牌组 {} ({} 包, 王: {})", deck_id, packs, jokers);
        Ok(DeckView {
            deck_id,
            remaining: cards.len(),
            cards,
        })
    }

    /// 抽牌，两个牌堆一起写回
    pub async fn draw(&self, id: DeckId, count: usize) -> Result<DrawOutcome, DeckError> {
        if count == 0 {
            return Err(DeckError::InvalidArgument("Invalid number of cards".to_string()));
        }

        let mut deck = self.store.get(id).await?;
        let history_len = deck.drawn.len();
        let cards = deck.draw(count, Utc::now())?;
        self.store
            .update_drawn_and_upcoming(id, &deck.drawn, &deck.upcoming)
            .await?;

        debug!("牌组 {} 抽出 {} 张牌，剩余 {}", id, cards.len(), deck.remaining());
        let stamped = deck.drawn.split_off(history_len);
        Ok(DrawOutcome {
            view: DeckView::new(&deck, cards),
            stamped,
        })
    }

    /// 洗牌，每次调用都用操作系统熵重新播种
    pub async fn shuffle(&self, id: DeckId) -> Result<DeckView, DeckError> {
        let mut deck = self.store.get(id).await?;
        deck.shuffle(&mut StdRng::from_os_rng());
        self.store.update_upcoming(id, &deck.upcoming).await?;

        debug!("牌组 {} 已洗牌，剩余 {}", id, deck.remaining());
        Ok(DeckView::new(&deck, deck.upcoming.clone()))
    }

    /// 把逗号分隔的牌追加到待抽牌堆底部
    ///
    /// 返回的 `cards` 是完整牌组加上新的待抽牌堆。
    pub async fn add_cards(&self, id: DeckId, raw_codes: &str) -> Result<DeckView, DeckError> {
        let mut deck = self.store.get(id).await?;
        let added = parse_card_codes(raw_codes);
        let added_count = added.len();
        deck.add_cards(added);
        self.store.update_upcoming(id, &deck.upcoming).await?;

        debug!("牌组 {} 追加了 {} 张牌，剩余 {}", id, added_count, deck.remaining());
        Ok(DeckView::new(&deck, deck.all_cards()))
    }

    /// 先查牌组再解析数量，不存在的牌组总是 `NotFound`
    pub async fn show_drawn(&self, id: DeckId, raw_count: &str) -> Result<Vec<DrawnCard>, DeckError> {
        let deck = self.store.get(id).await?;
        let count = parse_show_count(raw_count)?;
        Ok(deck.show_drawn(count)?.to_vec())
    }

    pub async fn show_upcoming(&self, id: DeckId, raw_count: &str) -> Result<Vec<Card>, DeckError> {
        let deck = self.store.get(id).await?;
        let count = parse_show_count(raw_count)?;
        Ok(deck.show_upcoming(count)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryDeckStore, SqliteDeckStore};
    use std::collections::HashMap;

    fn multiset(cards: &[Card]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for card in cards {
            *counts.entry(card.code.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[tokio::test]
    async fn test_create_persists_deck() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let view = engine.create(1, true).await.unwrap();
        assert_eq!(view.remaining, 54);
        assert_eq!(view.cards.len(), 54);

        let deck = engine.store().get(view.deck_id).await.unwrap();
        assert_eq!(deck.upcoming, view.cards);
        assert!(deck.drawn.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_pack_counts() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        assert_eq!(engine.create(11, false).await, Err(DeckError::TooManyPacks(11)));
        assert!(matches!(engine.create(0, false).await, Err(DeckError::InvalidArgument(_))));
        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_draw_persists_both_piles() {
        let engine = DeckEngine::new(SqliteDeckStore::in_memory().await.unwrap());
        let id = engine.create(1, false).await.unwrap().deck_id;

        let outcome = engine.draw(id, 5).await.unwrap();
        assert_eq!(outcome.view.remaining, 47);
        assert_eq!(outcome.view.cards.len(), 5);
        assert_eq!(outcome.stamped.len(), 5);
        for (card, stamped) in outcome.view.cards.iter().zip(&outcome.stamped) {
            assert_eq!(card.code, stamped.code);
            assert!(chrono::DateTime::parse_from_rfc3339(&stamped.time).is_ok());
        }

        let deck = engine.store().get(id).await.unwrap();
        assert_eq!(deck.drawn, outcome.stamped);
        assert_eq!(deck.upcoming.len(), 47);
    }

    #[tokio::test]
    async fn test_stamped_only_covers_current_draw() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;
        engine.draw(id, 3).await.unwrap();
        let outcome = engine.draw(id, 2).await.unwrap();
        assert_eq!(outcome.stamped.len(), 2);
        assert_eq!(outcome.stamped[0].code, "5h");
    }

    #[tokio::test]
    async fn test_draw_edge_cases() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;

        assert!(matches!(engine.draw(id, 0).await, Err(DeckError::InvalidArgument(_))));
        assert_eq!(engine.draw(Uuid::new_v4(), 1).await, Err(DeckError::NotFound));

        let outcome = engine.draw(id, 60).await.unwrap();
        assert_eq!(outcome.view.cards.len(), 52);
        assert_eq!(outcome.view.remaining, 0);
        assert_eq!(engine.draw(id, 1).await, Err(DeckError::EmptyDeck));
    }

    #[tokio::test]
    async fn test_shuffle_keeps_cards_and_history() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;
        engine.draw(id, 5).await.unwrap();
        let before = engine.store().get(id).await.unwrap();

        let view = engine.shuffle(id).await.unwrap();
        assert_eq!(view.remaining, 47);
        assert_eq!(multiset(&view.cards), multiset(&before.upcoming));

        let after = engine.store().get(id).await.unwrap();
        assert_eq!(after.upcoming, view.cards);
        assert_eq!(after.drawn, before.drawn);
        assert_eq!(engine.shuffle(Uuid::new_v4()).await, Err(DeckError::NotFound));
    }

    #[tokio::test]
    async fn test_repeated_shuffles_change_order() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;
        let original = engine.store().get(id).await.unwrap().upcoming;

        let mut orders = std::collections::HashSet::new();
        for _ in 0..20 {
            orders.insert(engine.shuffle(id).await.unwrap().cards);
        }
        assert!(orders.len() > 1);
        assert!(orders.iter().all(|order| multiset(order) == multiset(&original)));
    }

    #[tokio::test]
    async fn test_add_cards() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;
        engine.draw(id, 2).await.unwrap();

        let view = engine.add_cards(id, "as,zz").await.unwrap();
        assert_eq!(view.remaining, 52);
        assert_eq!(view.cards.len(), 52 + 52);
        assert_eq!(view.cards[103], Card::raw("zz"));

        let deck = engine.store().get(id).await.unwrap();
        assert_eq!(deck.upcoming.last(), Some(&Card::raw("zz")));
        assert_eq!(engine.add_cards(Uuid::new_v4(), "as").await, Err(DeckError::NotFound));
    }

    #[tokio::test]
    async fn test_accounting_across_operations() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(2, true).await.unwrap().deck_id;
        engine.draw(id, 7).await.unwrap();
        engine.add_cards(id, "x,y,z").await.unwrap();
        engine.shuffle(id).await.unwrap();
        engine.draw(id, 40).await.unwrap();
        engine.add_cards(id, "w").await.unwrap();

        let deck = engine.store().get(id).await.unwrap();
        assert_eq!(deck.drawn.len() + deck.upcoming.len(), deck.full.len() + 4);
    }

    #[tokio::test]
    async fn test_show_piles() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let id = engine.create(1, false).await.unwrap().deck_id;
        engine.draw(id, 5).await.unwrap();

        let drawn = engine.show_drawn(id, "0").await.unwrap();
        assert_eq!(drawn.len(), 5);
        let last = engine.show_drawn(id, "1").await.unwrap();
        assert_eq!(last, drawn[4..].to_vec());

        let upcoming = engine.show_upcoming(id, "0").await.unwrap();
        assert_eq!(upcoming.len(), 47);
        assert_eq!(engine.show_upcoming(id, "2").await.unwrap(), upcoming[..2].to_vec());

        assert!(matches!(engine.show_drawn(id, "6").await, Err(DeckError::InvalidArgument(_))));
        assert!(matches!(engine.show_upcoming(id, "abc").await, Err(DeckError::InvalidArgument(_))));
        assert_eq!(engine.show_upcoming(Uuid::new_v4(), "99").await, Err(DeckError::NotFound));
    }

    #[tokio::test]
    async fn test_show_looks_up_deck_before_count() {
        let engine = DeckEngine::new(MemoryDeckStore::new());
        let missing = Uuid::new_v4();
        assert_eq!(engine.show_drawn(missing, "abc").await, Err(DeckError::NotFound));
        assert_eq!(engine.show_upcoming(missing, "-1").await, Err(DeckError::NotFound));
    }

    #[tokio::test]
    async fn test_corrupted_pile_is_a_store_failure() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("deck.db").display());
        let engine = DeckEngine::new(SqliteDeckStore::connect(&url, 2).await.unwrap());
        let id = engine.create(1, false).await.unwrap().deck_id;

        let raw = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query("UPDATE decks SET upcoming = 'not json' WHERE id = ?")
            .bind(id.to_string())
            .execute(&raw)
            .await
            .unwrap();

        assert!(matches!(engine.draw(id, 1).await, Err(DeckError::StoreFailure(_))));
        assert!(matches!(engine.shuffle(id).await, Err(DeckError::StoreFailure(_))));
    }
}
