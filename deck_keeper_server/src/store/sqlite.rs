use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use deck_keeper_core::{Card, Deck, DeckId, DrawnCard};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::debug;

use super::{DeckStore, StoreError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS decks (
    id TEXT PRIMARY KEY,
    cards TEXT NOT NULL,     -- 完整牌组
    drawn TEXT NOT NULL,     -- 抽牌历史
    upcoming TEXT NOT NULL   -- 待抽牌堆
)";

/// 基于 SQLite 的牌组存储
///
/// 三个牌堆以 JSON 文本保存在同一行里，
/// 每个写操作都是单条 UPDATE，SQLite 保证它的原子性。
#[derive(Clone)]
pub struct SqliteDeckStore {
    pool: SqlitePool,
}

impl SqliteDeckStore {
    /// 连接数据库 (文件不存在时自动创建) 并建表
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// 内存数据库只存在于单个连接里，所以连接池固定为一个永不回收的连接
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DeckStore for SqliteDeckStore {
    async fn create(&self, id: DeckId, full: &[Card]) -> Result<(), StoreError> {
        let cards = serde_json::to_string(full)?;
        let result = sqlx::query("INSERT INTO decks (id, cards, drawn, upcoming) VALUES (?, ?, '[]', ?)")
            .bind(id.to_string())
            .bind(cards.clone())
            .bind(cards)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Err(StoreError::DuplicateKey),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: DeckId) -> Result<Deck, StoreError> {
        let row = sqlx::query("SELECT cards, drawn, upcoming FROM decks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        let full: String = row.try_get("cards")?;
        let drawn: String = row.try_get("drawn")?;
        let upcoming: String = row.try_get("upcoming")?;
        Ok(Deck {
            id,
            full: serde_json::from_str(&full)?,
            drawn: serde_json::from_str(&drawn)?,
            upcoming: serde_json::from_str(&upcoming)?,
        })
    }

    async fn update_upcoming(&self, id: DeckId, upcoming: &[Card]) -> Result<(), StoreError> {
        let upcoming = serde_json::to_string(upcoming)?;
        let result = sqlx::query("UPDATE decks SET upcoming = ? WHERE id = ?")
            .bind(upcoming)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        debug!("牌组 {} 的待抽牌堆已更新", id);
        Ok(())
    }

    async fn update_drawn_and_upcoming(
        &self,
        id: DeckId,
        drawn: &[DrawnCard],
        upcoming: &[Card],
    ) -> Result<(), StoreError> {
        // 先完成两次序列化，再用一条语句同时写入两列
        let drawn = serde_json::to_string(drawn)?;
        let upcoming = serde_json::to_string(upcoming)?;
        let result = sqlx::query("UPDATE decks SET drawn = ?, upcoming = ? WHERE id = ?")
            .bind(drawn)
            .bind(upcoming)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        debug!("牌组 {} 的抽牌历史和待抽牌堆已更新", id);
        Ok(())
    }
}
