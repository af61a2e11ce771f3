use crate::card::Card;
use crate::deck::{Deck, DeckId, DrawnCard};
use serde::{Deserialize, Serialize};

// --- 服务器 -> 客户端 的响应 ---

/// 创建、抽牌、洗牌、追加牌之后返回的牌组视图
///
/// `cards` 为空时不序列化，`remaining` 总是等于待抽牌堆的长度。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeckView {
    pub deck_id: DeckId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
    pub remaining: usize,
}

impl DeckView {
    pub fn new(deck: &Deck, cards: Vec<Card>) -> Self {
        DeckView {
            deck_id: deck.id,
            cards,
            remaining: deck.remaining(),
        }
    }
}

/// 一次抽牌的结果
///
/// `view.cards` 是抽出的牌本身，`stamped` 是同一批牌追加到历史里的记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub view: DeckView,
    pub stamped: Vec<DrawnCard>,
}
