use std::{future::Future, sync::Arc};

use axum::http::{HeaderMap, HeaderValue};
use reqwest::header;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{NewComment, Post, PostSlug, Reference, queries};
use crate::{
    config::SanityConfig,
    error::{Error, Result},
};

/// 文章内容来源
///
/// 静态页面生成器只依赖这个接口，便于替换为测试用的内存实现。
pub trait ContentSource: Send + Sync {
    /// 查询所有文章的 slug
    fn post_slugs(&self) -> impl Future<Output = Result<Vec<PostSlug>>> + Send;

    /// 按 slug 查询单篇文章
    ///
    /// 返回 [`Post`]，没有匹配的文章时返回 `None`，这不是错误。
    fn post_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Post>>> + Send;
}

/// 基于 HTTP 查询接口的内容客户端
///
/// 不做任何重试，网络错误与非 2xx 状态直接向上返回。
#[derive(Clone)]
pub struct SanityClient {
    client: reqwest::Client,
    config: Arc<SanityConfig>,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

#[derive(Serialize)]
struct Mutations<'a> {
    mutations: [Mutation<'a>; 1],
}

#[derive(Serialize)]
struct Mutation<'a> {
    create: CommentDocument<'a>,
}

#[derive(Serialize)]
struct CommentDocument<'a> {
    #[serde(rename = "_type")]
    kind: &'static str,
    post: Reference,
    name: &'a str,
    email: &'a str,
    comment: &'a str,
}

impl SanityClient {
    pub fn new(config: SanityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers({
                let mut header = HeaderMap::new();
                header.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
                header
            })
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    /// 执行 GROQ 查询
    ///
    /// 参数以 `$name=<JSON>` 的形式编码到查询串中，结果为 `null` 时返回 `None`。
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<Option<T>> {
        let mut pairs = Vec::with_capacity(params.len() + 1);
        pairs.push(("query".to_string(), query.to_string()));
        for (name, value) in params {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }

        let mut request = self.client.get(self.config.query_url()).query(&pairs);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?.error_for_status()?;
        let body = resp.bytes().await?;
        let parsed: QueryResponse<T> = serde_json::from_slice(&body)?;
        Ok(parsed.result)
    }

    /// 创建一条待审核的评论
    ///
    /// 评论的 `approved` 字段不写入，由外部审核流程设置。
    pub async fn create_comment(&self, comment: &NewComment) -> Result<()> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or_else(|| Error::Config("环境变量 `SANITY_API_TOKEN` 未设置".to_string()))?;

        let body = Mutations {
            mutations: [Mutation {
                create: CommentDocument {
                    kind: "comment",
                    post: Reference::to(&comment.post_id),
                    name: &comment.name,
                    email: &comment.email,
                    comment: &comment.comment,
                },
            }],
        };

        let resp = self
            .client
            .post(self.config.mutate_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("{} | {}", status, text.trim())));
        }
        Ok(())
    }
}

impl ContentSource for SanityClient {
    async fn post_slugs(&self) -> Result<Vec<PostSlug>> {
        let slugs: Option<Vec<PostSlug>> = self.fetch(queries::POST_SLUGS, &[]).await?;
        Ok(slugs.unwrap_or_default())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.fetch(queries::POST_BY_SLUG, &[("slug", slug.into())])
            .await
    }
}
