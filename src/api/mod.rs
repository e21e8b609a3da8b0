mod comment;
mod post;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{error::Result, state::AppState};

/// 配置路由
///
/// - `GET /post/{slug}`：文章页面
/// - `POST /post/{slug}`：页面中的评论表单提交
/// - `POST /api/createComment`：创建待审核评论
pub fn setup_route(state: AppState) -> Router {
    let router = Router::new()
        .route("/post/{slug}", get(post::show_post).post(post::submit_comment))
        .route("/api/createComment", post(comment::create_comment))
        .with_state(state);

    add_middlewares(router)
}

pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let router = setup_route(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {}),
    )
}
