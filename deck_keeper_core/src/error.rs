use thiserror::Error;

/// 牌组操作可能出现的全部错误
///
/// 这里不关心传输层，状态码的映射由服务端负责。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    /// 数量、包数等参数不合法
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Deck not found")]
    NotFound,

    /// 对已经抽完的牌组继续抽牌
    #[error("Deck empty")]
    EmptyDeck,

    /// 包数超过 `MAX_PACKS`
    #[error("Too many decks")]
    TooManyPacks(u32),

    #[error("Deck already exists")]
    DuplicateKey,

    /// 持久化读写或序列化失败
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

pub type Result<T> = std::result::Result<T, DeckError>;
