use clap::Parser;
use tracing::info;

use deck_keeper_server::store::{MemoryDeckStore, SqliteDeckStore};
use deck_keeper_server::{logger, router, Config, DeckEngine, DeckService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    logger::init_logger(config.verbose);

    let service = if config.in_memory {
        info!("使用内存存储，数据不会持久化");
        DeckService::spawn(DeckEngine::new(MemoryDeckStore::new()), config.queue_depth)
    } else {
        let store = SqliteDeckStore::connect(&config.database, config.max_connections).await?;
        info!("已连接数据库 {}", config.database);
        DeckService::spawn(DeckEngine::new(store), config.queue_depth)
    };

    let app = router(service);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("服务器正在监听 {}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务器已关闭");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // 无法监听信号时只能一直运行下去
        std::future::pending::<()>().await;
    }
}
