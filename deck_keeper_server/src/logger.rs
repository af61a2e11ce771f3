use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志，`RUST_LOG` 优先于 `verbose`
pub fn init_logger(verbose: bool) {
    let default = if verbose {
        "deck_keeper_server=debug,info"
    } else {
        "deck_keeper_server=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}
