use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DeckError;

// --- 核心数据结构定义 ---

/// 一副牌最多可以由多少个标准包组成
pub const MAX_PACKS: u32 = 10;

/// 每个标准包的牌数 (不含大小王)
pub const CARDS_PER_PACK: usize = 52;

/// 每个包附带的大小王数量
pub const JOKERS_PER_PACK: usize = 2;

pub const JOKER_CODE: &str = "joker";

/// 花色 (Suit)
/// 变体顺序就是生成牌组时的顺序: h, d, c, s
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Suit {
    Heart,   // 红心 ♥️
    Diamond, // 方块 ♦️
    Club,    // 梅花 ♣️
    Spade,   // 黑桃 ♠️
}

/// 点数 (Rank)
/// 变体顺序就是生成牌组时的顺序: 2..10, j, q, k, a
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Club, Suit::Spade];

    pub fn code(self) -> &'static str {
        match self {
            Suit::Heart => "h",
            Suit::Diamond => "d",
            Suit::Club => "c",
            Suit::Spade => "s",
        }
    }
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "j",
            Rank::Queen => "q",
            Rank::King => "k",
            Rank::Ace => "a",
        }
    }
}

/// 单张牌 (Card)
///
/// 牌只通过 `code` 区分，一副牌里允许出现重复的 code (多包、两张王)。
/// 通过 add 接口追加的牌只有 `code`，其余字段为空字符串。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct Card {
    pub code: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub suit: String,
    #[serde(default)]
    pub image: String,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        let code = format!("{}{}", rank.code(), suit.code());
        Card {
            image: image_for(&code),
            rank: rank.code().to_string(),
            suit: suit.code().to_string(),
            code,
        }
    }

    pub fn joker() -> Card {
        Card {
            code: JOKER_CODE.to_string(),
            rank: JOKER_CODE.to_string(),
            suit: String::new(),
            image: image_for(JOKER_CODE),
        }
    }

    /// 调用方直接给出的牌，不做任何校验
    pub fn raw(code: impl Into<String>) -> Card {
        Card {
            code: code.into(),
            rank: String::new(),
            suit: String::new(),
            image: String::new(),
        }
    }
}

/// 牌面图片的地址只由 code 决定
fn image_for(code: &str) -> String {
    format!("/static/{}.svg", code)
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

// --- 牌组生成 ---

/// 创建一个标准包 (52 张)，顺序固定
fn create_pack() -> Vec<Card> {
    let mut pack = Vec::with_capacity(CARDS_PER_PACK + JOKERS_PER_PACK);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            pack.push(Card::new(rank, suit));
        }
    }
    pack
}

/// 生成 `packs` 个包组成的完整牌组
///
/// 结果是确定的：相同的参数总是返回顺序完全一致的牌。
/// 开启 `jokers` 时每个包末尾追加两张王。
///
/// # Errors
/// - `packs == 0` 返回 `InvalidArgument`
/// - `packs > MAX_PACKS` 返回 `TooManyPacks`
pub fn generate(packs: u32, jokers: bool) -> Result<Vec<Card>, DeckError> {
    if packs == 0 {
        return Err(DeckError::InvalidArgument("Invalid number of packs".to_string()));
    }
    if packs > MAX_PACKS {
        return Err(DeckError::TooManyPacks(packs));
    }

    let per_pack = CARDS_PER_PACK + if jokers { JOKERS_PER_PACK } else { 0 };
    let mut cards = Vec::with_capacity(per_pack * packs as usize);
    for _ in 0..packs {
        cards.extend(create_pack());
        if jokers {
            cards.push(Card::joker());
            cards.push(Card::joker());
        }
    }
    Ok(cards)
}

/// 解析逗号分隔的牌 code 列表
///
/// 空白会被去掉，空项直接忽略；code 本身不做校验。
pub fn parse_card_codes(raw: &str) -> Vec<Card> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(Card::raw)
        .collect()
}

// --- 单元测试 ---
