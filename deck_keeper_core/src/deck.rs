use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Card;
use crate::error::{DeckError, Result};

pub type DeckId = Uuid;

/// 已抽出的牌，记录抽牌时间 (RFC3339)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub code: String,
    pub time: String,
}

impl DrawnCard {
    pub fn stamp(card: &Card, at: DateTime<Utc>) -> DrawnCard {
        DrawnCard {
            code: card.code.clone(),
            time: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// 牌组的完整状态
///
/// 牌组没有显式的状态字段，三个牌堆本身就是状态：
/// - `full`: 创建时生成的完整牌组，之后不再改变
/// - `drawn`: 抽牌历史，只追加，保持时间顺序
/// - `upcoming`: 尚未抽出的牌，下标 0 就是下一张
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub full: Vec<Card>,
    pub drawn: Vec<DrawnCard>,
    pub upcoming: Vec<Card>,
}

/// 查看哪一个牌堆
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pile {
    Drawn,
    Upcoming,
}

impl Pile {
    /// "0" 是抽牌历史，"1" 是待抽牌堆
    pub fn parse(raw: &str) -> Result<Pile> {
        match raw {
            "0" => Ok(Pile::Drawn),
            "1" => Ok(Pile::Upcoming),
            _ => Err(DeckError::InvalidArgument("Invalid show type".to_string())),
        }
    }
}

// --- 参数解析 ---

/// 抽牌数量必须是正整数
pub fn parse_draw_count(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(invalid_draw_count()),
    }
}

/// 查看数量必须是非负整数，0 表示全部
pub fn parse_show_count(raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|_| invalid_show_count())
}

fn invalid_draw_count() -> DeckError {
    DeckError::InvalidArgument("Invalid number of cards".to_string())
}

fn invalid_show_count() -> DeckError {
    DeckError::InvalidArgument("Invalid count".to_string())
}

// --- Deck 的状态转移 ---

impl Deck {
    /// 新牌组：待抽牌堆就是完整牌组，历史为空
    pub fn new(id: DeckId, full: Vec<Card>) -> Deck {
        Deck {
            id,
            upcoming: full.clone(),
            full,
            drawn: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.upcoming.len()
    }

    /// 从待抽牌堆顶部抽出 `count` 张牌
    ///
    /// 数量超过剩余牌数时只抽剩下的牌，不算错误。
    /// 抽出的牌带上时间 `at` 追加到历史末尾。
    ///
    /// # Errors
    /// - `count == 0` 返回 `InvalidArgument`
    /// - 待抽牌堆为空返回 `EmptyDeck`
    pub fn draw(&mut self, count: usize, at: DateTime<Utc>) -> Result<Vec<Card>> {
        if count == 0 {
            return Err(invalid_draw_count());
        }
        if self.upcoming.is_empty() {
            return Err(DeckError::EmptyDeck);
        }

        let count = count.min(self.upcoming.len());
        let cards: Vec<Card> = self.upcoming.drain(..count).collect();
        self.drawn.extend(cards.iter().map(|card| DrawnCard::stamp(card, at)));
        Ok(cards)
    }

    /// 打乱待抽牌堆，历史不受影响
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.upcoming.shuffle(rng);
    }

    /// 追加到待抽牌堆底部
    pub fn add_cards(&mut self, cards: Vec<Card>) {
        self.upcoming.extend(cards);
    }

    /// 完整牌组加上当前待抽牌堆，add 接口返回这个视图
    pub fn all_cards(&self) -> Vec<Card> {
        self.full.iter().chain(self.upcoming.iter()).cloned().collect()
    }

    /// 最近抽出的 `count` 张，`count == 0` 返回全部历史
    pub fn show_drawn(&self, count: usize) -> Result<&[DrawnCard]> {
        if count > self.drawn.len() {
            return Err(invalid_show_count());
        }
        if count == 0 {
            return Ok(&self.drawn);
        }
        Ok(&self.drawn[self.drawn.len() - count..])
    }

    /// 接下来要抽的 `count` 张，`count == 0` 返回整个待抽牌堆
    pub fn show_upcoming(&self, count: usize) -> Result<&[Card]> {
        if count > self.upcoming.len() {
            return Err(invalid_show_count());
        }
        if count == 0 {
            return Ok(&self.upcoming);
        }
        Ok(&self.upcoming[..count])
    }
}

// --- 单元测试 ---
