use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    comment::{CommentForm, CommentSubmission, SubmissionState},
    error::Result,
    generator::Page,
    page,
    state::AppState,
};

/// 文章页面
///
/// 没有匹配的文章时返回 404 页面。
pub async fn show_post(Path(slug): Path<String>, State(state): State<AppState>) -> Result<Response> {
    match state.generator().page(&slug).await? {
        Page::Found(post) => {
            let html = page::render_post(&post, state.images(), &SubmissionState::default(), None)?;
            Ok(Html(html).into_response())
        }
        Page::NotFound => not_found(&slug),
    }
}

/// 提交评论表单，并按提交结果重新渲染页面
///
/// 提交状态只存在于本次响应中，刷新页面后重新显示表单。
pub async fn submit_comment(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let Page::Found(post) = state.generator().page(&slug).await? else {
        return not_found(&slug);
    };

    let mut submission = CommentSubmission::new(&post.id);
    submission.submit(form.clone(), state.sender()).await;

    let html = page::render_post(&post, state.images(), submission.state(), Some(&form))?;
    let status = match submission.state() {
        SubmissionState::Editing { errors, .. } if !errors.is_empty() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::OK,
    };
    Ok((status, Html(html)).into_response())
}

fn not_found(slug: &str) -> Result<Response> {
    Ok((StatusCode::NOT_FOUND, Html(page::render_not_found(slug)?)).into_response())
}
