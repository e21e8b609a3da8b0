use std::future::Future;

use crate::{
    content::NewComment,
    error::{Error, Result},
};

/// 评论创建接口的调用方
pub trait CommentSender: Send + Sync {
    /// 发送一次创建请求，只关心成功与否
    fn send(&self, comment: &NewComment) -> impl Future<Output = Result<()>> + Send;
}

/// 通过 HTTP 调用 `POST /api/createComment`
///
/// 请求没有超时，也不会取消。
#[derive(Clone)]
pub struct HttpCommentSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCommentSender {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl CommentSender for HttpCommentSender {
    async fn send(&self, comment: &NewComment) -> Result<()> {
        let resp = self.client.post(&self.endpoint).json(comment).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("createComment responded {status}")));
        }
        Ok(())
    }
}
