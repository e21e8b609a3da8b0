use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{comment::CommentForm, content::NewComment, error::Result, state::AppState};

/// 创建一条待审核评论
///
/// 载荷为 `{ _id, name, email, comment }`，缺少必填字段时返回 400。
pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<NewComment>,
) -> Result<Response> {
    let mut errors: Vec<&str> = CommentForm::from(payload.clone())
        .validate()
        .iter()
        .map(|e| e.message())
        .collect();
    if payload.post_id.trim().is_empty() {
        errors.push("The Post Id is Required!");
    }

    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid comment", "errors": errors })),
        )
            .into_response());
    }

    state.client().create_comment(&payload).await?;
    tracing::info!(post_id = %payload.post_id, "comment created");

    Ok(Json(json!({ "message": "Comment submitted" })).into_response())
}
