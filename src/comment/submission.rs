use super::{CommentForm, CommentSender, FieldError};

/// 评论提交流程的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// 初始状态
    ///
    /// - `errors`：上一次提交缺失的必填字段
    /// - `failed`：上一次请求失败
    Editing {
        errors: Vec<FieldError>,
        failed: bool,
    },
    /// 提交成功，本次会话内不会再发送请求
    Submitted,
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Editing {
            errors: Vec::new(),
            failed: false,
        }
    }
}

/// 单篇文章的评论提交流程
///
/// 状态只存在于本次交互中，不做持久化。
#[derive(Debug, Clone)]
pub struct CommentSubmission {
    post_id: String,
    state: SubmissionState,
}

impl CommentSubmission {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            state: SubmissionState::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted)
    }

    /// 提交表单
    ///
    /// - 校验失败：保持 Editing，记录缺失字段，不发送请求
    /// - 请求失败：记录日志，保持 Editing 并标记失败
    /// - 请求成功：进入 Submitted
    pub async fn submit<C: CommentSender>(
        &mut self,
        form: CommentForm,
        sender: &C,
    ) -> &SubmissionState {
        if self.is_submitted() {
            return &self.state;
        }

        let errors = form.validate();
        if !errors.is_empty() {
            self.state = SubmissionState::Editing {
                errors,
                failed: false,
            };
            return &self.state;
        }

        let payload = form.into_payload(&self.post_id);
        self.state = match sender.send(&payload).await {
            Ok(()) => {
                tracing::info!(post_id = %self.post_id, "comment submitted");
                SubmissionState::Submitted
            }
            Err(e) => {
                tracing::warn!(post_id = %self.post_id, %e, "comment submission failed");
                SubmissionState::Editing {
                    errors: Vec::new(),
                    failed: true,
                }
            }
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::{
        content::NewComment,
        error::{Error, Result},
    };

    /// 记录所有请求的发送器
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<NewComment>>,
        fail: AtomicBool,
    }

    impl CommentSender for RecordingSender {
        async fn send(&self, comment: &NewComment) -> Result<()> {
            self.sent.lock().unwrap().push(comment.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Upstream("endpoint down".to_string()));
            }
            Ok(())
        }
    }

    fn form(name: &str, email: &str, comment: &str) -> CommentForm {
        CommentForm {
            post_id: "p1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            comment: comment.to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_submit_sends_one_request() {
        let sender = RecordingSender::default();
        let mut flow = CommentSubmission::new("p1");

        let state = flow
            .submit(form("Al", "al@example.com", "Nice"), &sender)
            .await;
        assert_eq!(state, &SubmissionState::Submitted);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![NewComment {
                post_id: "p1".to_string(),
                name: "Al".to_string(),
                email: "al@example.com".to_string(),
                comment: "Nice".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_fields_stay_editing() {
        let sender = RecordingSender::default();
        let mut flow = CommentSubmission::new("p1");

        let state = flow.submit(form("Al", "", "Nice"), &sender).await;
        assert_eq!(
            state,
            &SubmissionState::Editing {
                errors: vec![FieldError::Email],
                failed: false
            }
        );
        assert!(sender.sent.lock().unwrap().is_empty(), "校验失败不应发送请求");
    }

    #[tokio::test]
    async fn test_failed_request_stays_editing() {
        let sender = RecordingSender::default();
        sender.fail.store(true, Ordering::SeqCst);
        let mut flow = CommentSubmission::new("p1");

        let state = flow
            .submit(form("Al", "al@example.com", "Nice"), &sender)
            .await;
        assert_eq!(
            state,
            &SubmissionState::Editing {
                errors: vec![],
                failed: true
            }
        );

        // 用户可以手动重试
        sender.fail.store(false, Ordering::SeqCst);
        let state = flow
            .submit(form("Al", "al@example.com", "Nice"), &sender)
            .await;
        assert_eq!(state, &SubmissionState::Submitted);
        assert_eq!(sender.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_submitted_is_terminal() {
        let sender = RecordingSender::default();
        let mut flow = CommentSubmission::new("p1");

        flow.submit(form("Al", "al@example.com", "Nice"), &sender)
            .await;
        flow.submit(form("Bo", "bo@example.com", "Again"), &sender)
            .await;

        assert!(flow.is_submitted());
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }
}
