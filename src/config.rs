use std::{
    env,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use crate::error::{Error, Result};

const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2021-10-21";
const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
const DEFAULT_REVALIDATE_SECS: u64 = 60;

/// 内容 API 连接配置
///
/// 只在启动时构建一次，随后显式注入 [`SanityClient`](crate::content::SanityClient)。
#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// 写入评论时使用的 token，只读部署可以不配置
    pub token: Option<String>,
    pub use_cdn: bool,
    /// 覆盖默认的 `https://<project>.api.sanity.io`，测试时指向本地模拟服务
    pub base_url: Option<String>,
}

impl SanityConfig {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            use_cdn: false,
            base_url: None,
        }
    }

    /// API 根地址，不带结尾的 `/`
    ///
    /// CDN 只在没有 token 时使用，带 token 的请求必须访问实时 API。
    pub fn api_base(&self) -> String {
        if let Some(base) = &self.base_url {
            return base.trim_end_matches('/').to_string();
        }
        let host = if self.use_cdn && self.token.is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        format!("https://{}.{}", self.project_id, host)
    }

    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.api_base(),
            self.api_version,
            self.dataset
        )
    }

    pub fn mutate_url(&self) -> String {
        format!(
            "{}/v{}/data/mutate/{}",
            self.api_base(),
            self.api_version,
            self.dataset
        )
    }
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct Config {
    pub sanity: SanityConfig,
    pub listen: SocketAddr,
    /// 未配置时指向本服务自己的 `/api/createComment`
    pub comment_endpoint: String,
    pub revalidate: Duration,
}

impl Config {
    /// 从进程环境变量读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值来源构建配置
    ///
    /// 空字符串视为未设置。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = get("SANITY_PROJECT_ID")
            .ok_or_else(|| Error::Config("环境变量 `SANITY_PROJECT_ID` 未设置".to_string()))?;

        let mut sanity = SanityConfig::new(
            project_id,
            get("SANITY_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string()),
        );
        if let Some(version) = get("SANITY_API_VERSION") {
            sanity.api_version = version.trim_start_matches('v').to_string();
        }
        sanity.token = get("SANITY_API_TOKEN");
        sanity.use_cdn = match get("SANITY_USE_CDN") {
            Some(v) => parse_bool("SANITY_USE_CDN", &v)?,
            None => false,
        };

        let listen = get("POSTPAGE_LISTEN")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("`POSTPAGE_LISTEN` 无法解析: {e}")))?;

        let comment_endpoint =
            get("POSTPAGE_COMMENT_ENDPOINT").unwrap_or_else(|| local_comment_endpoint(listen));

        let revalidate = match get("POSTPAGE_REVALIDATE_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| {
                Error::Config(format!("`POSTPAGE_REVALIDATE_SECS` 无法解析: {e}"))
            })?,
            None => DEFAULT_REVALIDATE_SECS,
        };

        Ok(Self {
            sanity,
            listen,
            comment_endpoint,
            revalidate: Duration::from_secs(revalidate),
        })
    }
}

/// 监听地址对应的本机评论接口，通配地址换成回环地址
fn local_comment_endpoint(listen: SocketAddr) -> String {
    let ip = match listen.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}/api/createComment", SocketAddr::new(ip, listen.port()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!("`{key}` 不是布尔值: {other}"))),
    }
}
