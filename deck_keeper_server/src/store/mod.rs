//! 牌组的持久化
//!
//! 每副牌一条记录，三个牌堆分别序列化保存。
//! 所有写操作在单副牌的粒度上都是原子的。

mod memory;
mod sqlite;

pub use memory::MemoryDeckStore;
pub use sqlite::SqliteDeckStore;

use async_trait::async_trait;
use deck_keeper_core::{Card, Deck, DeckError, DeckId, DrawnCard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("deck not found")]
    NotFound,

    #[error("deck already exists")]
    DuplicateKey,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for DeckError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DeckError::NotFound,
            StoreError::DuplicateKey => DeckError::DuplicateKey,
            other => DeckError::StoreFailure(other.to_string()),
        }
    }
}

#[async_trait]
pub trait DeckStore: Send + Sync {
    /// 插入新牌组，`drawn` 为空，`upcoming` 等于 `full`
    async fn create(&self, id: DeckId, full: &[Card]) -> Result<(), StoreError>;

    async fn get(&self, id: DeckId) -> Result<Deck, StoreError>;

    async fn update_upcoming(&self, id: DeckId, upcoming: &[Card]) -> Result<(), StoreError>;

    /// 两个牌堆必须一起写入，不能出现只更新了其中一个的中间状态
    async fn update_drawn_and_upcoming(
        &self,
        id: DeckId,
        drawn: &[DrawnCard],
        upcoming: &[Card],
    ) -> Result<(), StoreError>;
}
