use askama::Template;
use chrono::Local;

use crate::{
    comment::{CommentForm, SubmissionState},
    content::{ImageUrlBuilder, Post},
    error::Result,
    render,
};

const PUBLISHED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// 文章页面的展示数据
#[derive(Debug)]
pub struct PostView {
    pub slug: String,
    pub post_id: String,
    pub title: String,
    pub description: String,
    pub main_image_url: String,
    pub author_name: String,
    pub author_image_url: String,
    pub published_at: String,
    pub body_html: String,
    pub comments: Vec<CommentLine>,
    pub form: FormView,
}

#[derive(Debug)]
pub struct CommentLine {
    pub id: String,
    pub name: String,
    pub comment: String,
}

/// 表单区域：提交表单或感谢提示
#[derive(Debug, Default)]
pub struct FormView {
    pub submitted: bool,
    pub failed: bool,
    pub errors: Vec<&'static str>,
    pub name: String,
    pub email: String,
    pub comment: String,
}

impl FormView {
    /// 根据提交状态构建；Editing 时回填用户已输入的内容
    pub fn new(state: &SubmissionState, input: Option<&CommentForm>) -> Self {
        match state {
            SubmissionState::Submitted => Self {
                submitted: true,
                ..Default::default()
            },
            SubmissionState::Editing { errors, failed } => {
                let mut view = Self {
                    failed: *failed,
                    errors: errors.iter().map(|e| e.message()).collect(),
                    ..Default::default()
                };
                if let Some(input) = input {
                    view.name = input.name.clone();
                    view.email = input.email.clone();
                    view.comment = input.comment.clone();
                }
                view
            }
        }
    }
}

impl PostView {
    pub fn new(post: &Post, images: &ImageUrlBuilder, form: FormView) -> Self {
        Self {
            slug: post.slug.current.clone(),
            post_id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            main_image_url: images.url_or_empty(post.main_image.as_ref()),
            author_name: post.author.name.clone(),
            author_image_url: images.url_or_empty(post.author.image.as_ref()),
            published_at: post
                .created_at
                .with_timezone(&Local)
                .format(PUBLISHED_AT_FORMAT)
                .to_string(),
            body_html: render::render_blocks(&post.body, images),
            comments: post
                .approved_comments()
                .map(|c| CommentLine {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    comment: c.comment.clone(),
                })
                .collect(),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: PostView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub slug: String,
}

/// 渲染文章页面
pub fn render_post(
    post: &Post,
    images: &ImageUrlBuilder,
    state: &SubmissionState,
    input: Option<&CommentForm>,
) -> Result<String> {
    let view = PostView::new(post, images, FormView::new(state, input));
    Ok(PostTemplate { view }.render()?)
}

/// 渲染 404 页面
pub fn render_not_found(slug: &str) -> Result<String> {
    Ok(NotFoundTemplate {
        slug: slug.to_string(),
    }
    .render()?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::comment::FieldError;

    fn images() -> ImageUrlBuilder {
        ImageUrlBuilder::new("abc123", "production")
    }

    fn hello_world() -> Post {
        serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2022-03-01T10:20:30Z",
            "title": "Hello <World>",
            "description": "First post",
            "slug": { "current": "hello-world" },
            "mainImage": { "asset": { "_ref": "image-main-800x600-jpg" } },
            "author": { "name": "Sonny", "image": { "asset": { "_ref": "image-face-64x64-png" } } },
            "body": [{
                "_type": "block",
                "style": "h1",
                "children": [{ "_type": "span", "text": "Hi", "marks": [] }]
            }],
            "comments": [
                { "_id": "c1", "name": "Al", "comment": "Nice", "approved": true },
                { "_id": "c2", "name": "Bo", "comment": "Spam", "approved": false }
            ]
        }))
        .expect("反序列化失败")
    }

    #[test]
    fn test_renders_only_approved_comments() {
        let html = render_post(&hello_world(), &images(), &SubmissionState::default(), None)
            .expect("渲染失败");

        assert!(html.contains(r#"<span class="text-yellow-500">Al</span>: <span>Nice</span>"#));
        assert!(!html.contains(">Bo<"));
        assert!(!html.contains(">Spam<"));
    }

    #[test]
    fn test_renders_post_content() {
        let html = render_post(&hello_world(), &images(), &SubmissionState::default(), None)
            .expect("渲染失败");

        assert!(!html.contains("Hello <World>"), "标题需要转义");
        assert!(html.contains("Hello &#60;World&#62;"));
        assert!(html.contains(r#"<h1 class="text-2xl font-bold my-5">Hi</h1>"#));
        assert!(html.contains("https://cdn.sanity.io/images/abc123/production/main-800x600.jpg"));
        assert!(html.contains("https://cdn.sanity.io/images/abc123/production/face-64x64.png"));
        assert!(html.contains(r#"<span class="text-green-600">Sonny</span>"#));
        assert!(html.contains(r#"action="/post/hello-world""#));
        assert!(html.contains(r#"name="_id" value="p1""#));
    }

    #[test]
    fn test_submitted_shows_thanks_instead_of_form() {
        let html = render_post(&hello_world(), &images(), &SubmissionState::Submitted, None)
            .expect("渲染失败");

        assert!(html.contains("Thanks for submitting your comment!"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_editing_shows_field_errors_and_keeps_input() {
        let state = SubmissionState::Editing {
            errors: vec![FieldError::Email],
            failed: false,
        };
        let input = CommentForm {
            post_id: "p1".to_string(),
            name: "Al".to_string(),
            email: String::new(),
            comment: "Nice".to_string(),
        };

        let html = render_post(&hello_world(), &images(), &state, Some(&input)).expect("渲染失败");

        assert!(html.contains("The Email Field is Required!"));
        assert!(!html.contains("The Name Field is Required!"));
        assert!(html.contains(r#"name="name" value="Al""#));
        assert!(!html.contains("could not be submitted"));
    }

    #[test]
    fn test_failed_submission_notice() {
        let state = SubmissionState::Editing {
            errors: vec![],
            failed: true,
        };
        let html = render_post(&hello_world(), &images(), &state, None).expect("渲染失败");

        assert!(html.contains("Your comment could not be submitted. Please try again."));
    }

    #[test]
    fn test_not_found_page() {
        let html = render_not_found("missing").expect("渲染失败");
        assert!(html.contains("404"));
        assert!(html.contains("missing"));
    }
}
