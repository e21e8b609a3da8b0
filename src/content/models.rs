use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::render::Block;

/// 文章文档
///
/// 由内容作者在 CMS 中创建，本服务只读。
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: Slug,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub body: Vec<Block>,
    #[serde(default, deserialize_with = "nullable")]
    pub author: Author,
    /// 查询时已按 `approved == true` 过滤，保持 API 返回的顺序
    #[serde(default, deserialize_with = "nullable")]
    pub comments: Vec<Comment>,
}

impl Post {
    /// 可以展示的评论，未审核的评论即使混入也会被排除
    pub fn approved_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.approved)
    }
}

/// 作者，查询时通过引用展开
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// 评论
///
/// `approved` 只由外部审核流程修改。
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub post: Option<Reference>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: String,
    #[serde(default, deserialize_with = "nullable")]
    pub approved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "nullable")]
    pub current: String,
}

/// 文档引用 `{ "_ref": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type", default = "reference_type")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub id: String,
}

impl Reference {
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            kind: reference_type(),
            id: id.into(),
        }
    }
}

fn reference_type() -> String {
    "reference".to_string()
}

/// 图片字段，`asset` 指向图片资源文档
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub id: String,
}

/// 路径枚举查询的结果行
#[derive(Debug, Clone, Deserialize)]
pub struct PostSlug {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: Slug,
}

/// 新评论，即评论表单提交的 JSON 载荷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// 所属文章的 `_id`
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

/// GROQ 投影中缺失的字段会返回 `null`，统一转为默认值
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
