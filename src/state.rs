use std::{sync::Arc, time::Duration};

use crate::{
    comment::HttpCommentSender,
    config::Config,
    content::{ImageUrlBuilder, SanityClient},
    error::Result,
    generator::PageGenerator,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了页面生成器、评论发送器和图片地址构建器，提供统一访问入口。
#[derive(Clone)]
pub struct AppState {
    generator: Arc<PageGenerator<SanityClient>>,
    sender: HttpCommentSender,
    images: ImageUrlBuilder,
}

impl AppState {
    /// 根据配置创建 [`AppState`]
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::from_parts(
            SanityClient::new(config.sanity.clone())?,
            HttpCommentSender::new(&config.comment_endpoint)?,
            config.revalidate,
        ))
    }

    pub fn from_parts(
        client: SanityClient,
        sender: HttpCommentSender,
        revalidate: Duration,
    ) -> Self {
        let images = ImageUrlBuilder::new(&client.config().project_id, &client.config().dataset);
        Self {
            generator: Arc::new(PageGenerator::new(client, revalidate)),
            sender,
            images,
        }
    }

    /// 获取页面生成器
    pub fn generator(&self) -> &Arc<PageGenerator<SanityClient>> {
        &self.generator
    }

    /// 获取内容客户端
    pub fn client(&self) -> &SanityClient {
        self.generator.source()
    }

    /// 获取评论发送器
    pub fn sender(&self) -> &HttpCommentSender {
        &self.sender
    }

    /// 获取图片地址构建器
    pub fn images(&self) -> &ImageUrlBuilder {
        &self.images
    }
}
