//! 内容 API 使用的 GROQ 查询

/// 所有文章的 `_id` 与 slug，用于路径枚举
pub const POST_SLUGS: &str = r#"*[_type == "post"]{
  _id,
  slug {
    current
  }
}"#;

/// 按 `$slug` 查询单篇文章，展开作者并附带已审核的评论
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author -> {
    name,
    image
  },
  'comments': *[
    _type == "comment" &&
    post._ref == ^._id &&
    approved == true
  ],
  description,
  mainImage,
  slug,
  body
}"#;
