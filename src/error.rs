use std::io;

use axum::{http::StatusCode, response::IntoResponse};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("配置错误: {0}")]
    Config(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] askama::Error),

    #[error("内容 API 返回错误: {0}")]
    Upstream(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Config(e) => {
                tracing::error!(%e, "config error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
            Error::Reqwest(e) => {
                tracing::warn!(%e, "content api request failed");
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
            Error::Upstream(e) => {
                tracing::warn!(%e, "content api rejected request");
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
            Error::Json(e) => {
                tracing::warn!(%e, "unexpected content api payload");
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
            Error::Template(e) => {
                tracing::error!(%e, "template render error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
        }
    }
}
