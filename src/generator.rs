use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{OnceCell, RwLock},
    time::Instant,
};

use crate::{
    content::{ContentSource, Post},
    error::Result,
};

/// 默认的重新验证窗口
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(60);

/// 单个页面的路由参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParams {
    pub slug: String,
}

/// 构建时未知的路径如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// 在请求中同步生成，而不是直接返回 404
    Blocking,
}

#[derive(Debug, Clone)]
pub struct StaticPaths {
    pub paths: Vec<PathParams>,
    pub fallback: Fallback,
}

/// 页面数据的生成结果
#[derive(Debug, Clone)]
pub enum PageProps {
    Found { post: Arc<Post>, revalidate: Duration },
    NotFound,
}

/// 已生成的页面
#[derive(Debug, Clone)]
pub enum Page {
    Found(Arc<Post>),
    NotFound,
}

impl From<PageProps> for Page {
    fn from(props: PageProps) -> Self {
        match props {
            PageProps::Found { post, .. } => Page::Found(post),
            PageProps::NotFound => Page::NotFound,
        }
    }
}

#[derive(Debug)]
struct CachedPage {
    page: Page,
    generated_at: Instant,
    refreshing: bool,
}

/// 静态页面生成器
///
/// - 构建阶段：[`static_paths`](Self::static_paths) 枚举全部 slug，
///   [`prerender`](Self::prerender) 逐个生成页面
/// - 运行阶段：[`page`](Self::page) 在窗口内直接返回缓存，过期后先返回旧页面再在后台重新生成
///
/// 缓存只保存找到的文章，条目数不超过内容 API 中的文章数。
#[derive(Debug)]
pub struct PageGenerator<S> {
    source: S,
    revalidate: Duration,
    pages: RwLock<HashMap<String, CachedPage>>,
    /// 正在同步生成的 slug，同一 slug 的并发请求共享一次查询
    inflight: Mutex<HashMap<String, Arc<OnceCell<Page>>>>,
}

impl<S: ContentSource> PageGenerator<S> {
    pub fn new(source: S, revalidate: Duration) -> Self {
        Self {
            source,
            revalidate,
            pages: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 枚举所有文章，每个 slug 对应一组路由参数
    pub async fn static_paths(&self) -> Result<StaticPaths> {
        let paths = self
            .source
            .post_slugs()
            .await?
            .into_iter()
            .filter(|p| !p.slug.current.is_empty())
            .map(|p| PathParams {
                slug: p.slug.current,
            })
            .collect();

        Ok(StaticPaths {
            paths,
            fallback: Fallback::Blocking,
        })
    }

    /// 根据 slug 获取文章作为页面数据
    ///
    /// 没有匹配的文章返回 [`PageProps::NotFound`]，不重试。
    pub async fn static_props(&self, slug: &str) -> Result<PageProps> {
        match self.source.post_by_slug(slug).await? {
            Some(post) => Ok(PageProps::Found {
                post: Arc::new(post),
                revalidate: self.revalidate,
            }),
            None => {
                tracing::debug!(slug, "post not found");
                Ok(PageProps::NotFound)
            }
        }
    }

    /// 构建阶段：生成全部已知页面，返回生成的页面数
    ///
    /// 每次只有一个查询在进行。
    pub async fn prerender(&self) -> Result<usize> {
        let StaticPaths { paths, .. } = self.static_paths().await?;
        for params in &paths {
            self.generate(&params.slug).await?;
        }
        tracing::info!(pages = paths.len(), "prerender finished");
        Ok(paths.len())
    }

    async fn generate(&self, slug: &str) -> Result<Page> {
        let page = Page::from(self.static_props(slug).await?);
        self.store(slug, page.clone()).await;
        Ok(page)
    }

    /// 同一 slug 只有一个请求真正查询，其余请求等待它的结果
    ///
    /// 查询失败时等待者会各自重新查询。
    async fn generate_once(&self, slug: &str) -> Result<Page> {
        let cell = {
            let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(inflight.entry(slug.to_string()).or_default())
        };

        let result = cell.get_or_try_init(|| self.generate(slug)).await.cloned();

        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if inflight.get(slug).is_some_and(|c| Arc::ptr_eq(c, &cell)) {
            inflight.remove(slug);
        }
        result
    }

    /// 找到的文章写入缓存；未找到时移除旧条目，不保留 404
    async fn store(&self, slug: &str, page: Page) {
        let mut pages = self.pages.write().await;
        match page {
            Page::Found(_) => {
                pages.insert(
                    slug.to_string(),
                    CachedPage {
                        page,
                        generated_at: Instant::now(),
                        refreshing: false,
                    },
                );
            }
            Page::NotFound => {
                pages.remove(slug);
            }
        }
    }
}

impl<S: ContentSource + 'static> PageGenerator<S> {
    /// 获取页面
    ///
    /// - 窗口内：直接返回缓存
    /// - 已过期：返回旧页面，同时启动一次后台重新生成
    /// - 未生成过或不存在：在请求中同步生成
    pub async fn page(self: &Arc<Self>, slug: &str) -> Result<Page> {
        {
            let pages = self.pages.read().await;
            if let Some(entry) = pages.get(slug) {
                if entry.generated_at.elapsed() < self.revalidate {
                    return Ok(entry.page.clone());
                }
            }
        }

        {
            let mut pages = self.pages.write().await;
            if let Some(entry) = pages.get_mut(slug) {
                if entry.generated_at.elapsed() >= self.revalidate && !entry.refreshing {
                    entry.refreshing = true;
                    self.spawn_refresh(slug.to_string());
                }
                return Ok(entry.page.clone());
            }
        }

        self.generate_once(slug).await
    }

    fn spawn_refresh(self: &Arc<Self>, slug: String) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.static_props(&slug).await {
                Ok(props) => {
                    this.store(&slug, props.into()).await;
                    tracing::debug!(%slug, "page regenerated");
                }
                Err(e) => {
                    tracing::warn!(%slug, %e, "page regeneration failed, keep stale page");
                    if let Some(entry) = this.pages.write().await.get_mut(&slug) {
                        entry.refreshing = false;
                    }
                }
            }
        });
    }
}
