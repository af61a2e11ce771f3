//! 牌组服务端：存储、操作引擎、串行化队列和 HTTP 接口

pub mod config;
pub mod engine;
pub mod http;
pub mod logger;
pub mod service;
pub mod store;

pub use config::Config;
pub use engine::DeckEngine;
pub use http::{router, ApiError};
pub use service::DeckService;
