//! # 牌组核心逻辑库
//!
//! 这个 `core` crate 包含牌的定义、牌组生成规则、
//! 牌组三个牌堆的状态转移 (抽牌、洗牌、追加、查看)，
//! 以及错误类型和响应视图。
//! 它不涉及存储和网络，可以被任何上层应用复用。

mod card;
mod deck;
mod error;
mod message;

pub use card::*;

pub use deck::*;

pub use error::*;

pub use message::*;
