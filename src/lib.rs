pub mod api;
pub mod comment;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod generator;
pub mod page;
pub mod render;
pub mod state;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use state::AppState;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("POSTPAGE_LOG"))
        .init();
}

/// 启动服务
///
/// 先生成所有已知页面，再开始监听；生成失败不影响启动，页面会在请求时生成。
pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let state = AppState::new(&config)?;

    if let Err(e) = state.generator().prerender().await {
        tracing::warn!(%e, "prerender failed, pages will be generated on demand");
    }

    api::run_server(state, config.listen).await
}
