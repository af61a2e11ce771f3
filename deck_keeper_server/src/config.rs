use std::net::SocketAddr;

use clap::Parser;

/// 服务器启动参数，命令行优先，其次是环境变量
#[derive(Debug, Clone, Parser)]
#[command(name = "deck_keeper_server")]
#[command(about = "HTTP service for creating, drawing and shuffling card decks")]
pub struct Config {
    #[arg(long, env = "DECK_KEEPER_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// SQLite 数据库地址，文件不存在时自动创建
    #[arg(long, env = "DECK_KEEPER_DATABASE", default_value = "sqlite://deck.db")]
    pub database: String,

    #[arg(long, default_value = "4")]
    pub max_connections: u32,

    /// 只保存在内存里，进程退出后丢失
    #[arg(long)]
    pub in_memory: bool,

    #[arg(long, default_value = "64")]
    pub queue_depth: usize,

    #[arg(long, help = "Enable debug logging")]
    pub verbose: bool,
}
