use std::fmt;

use serde::Deserialize;

use crate::content::NewComment;

/// 必填字段缺失
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Name,
    Email,
    Comment,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Name => "The Name Field is Required!",
            FieldError::Email => "The Email Field is Required!",
            FieldError::Comment => "The Comment Field is Required!",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// 评论表单字段
///
/// `_id` 是隐藏字段，提交时以页面中的文章 id 为准。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

impl CommentForm {
    /// 检查必填字段，只含空白字符的字段视为缺失
    ///
    /// 返回缺失字段对应的错误，按表单顺序排列。
    pub fn validate(&self) -> Vec<FieldError> {
        [
            (FieldError::Name, &self.name),
            (FieldError::Email, &self.email),
            (FieldError::Comment, &self.comment),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(error, _)| error)
        .collect()
    }

    /// 生成提交给评论接口的载荷
    pub fn into_payload(self, post_id: impl Into<String>) -> NewComment {
        NewComment {
            post_id: post_id.into(),
            name: self.name,
            email: self.email,
            comment: self.comment,
        }
    }
}

impl From<NewComment> for CommentForm {
    fn from(value: NewComment) -> Self {
        Self {
            post_id: value.post_id,
            name: value.name,
            email: value.email,
            comment: value.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, comment: &str) -> CommentForm {
        CommentForm {
            post_id: "p1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_complete_form_is_valid() {
        assert!(form("Al", "al@example.com", "Nice").validate().is_empty());
    }

    #[test]
    fn test_reports_exactly_missing_fields() {
        assert_eq!(form("", "al@example.com", "Nice").validate(), vec![FieldError::Name]);
        assert_eq!(
            form("Al", " ", "").validate(),
            vec![FieldError::Email, FieldError::Comment]
        );
        assert_eq!(
            form("", "", "").validate(),
            vec![FieldError::Name, FieldError::Email, FieldError::Comment]
        );
    }

    #[test]
    fn test_payload_uses_page_post_id() {
        let mut f = form("Al", "al@example.com", "Nice");
        f.post_id = "tampered".to_string();

        let payload = f.into_payload("p1");
        assert_eq!(payload.post_id, "p1");
        assert_eq!(payload.name, "Al");
    }
}
