use serde::Deserialize;

use crate::content::{ImageRef, ImageUrlBuilder};

/// 富文本块，按 `_type` 区分
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageRef),
    /// 没有对应序列化器的块，渲染时跳过
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(rename = "listItem", default)]
    pub list_item: Option<ListKind>,
    /// 列表嵌套层级，从 1 开始
    #[serde(default)]
    pub level: Option<usize>,
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub children: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Number,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type")]
pub enum Inline {
    #[serde(rename = "span")]
    Span(Span),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// 标注定义，span 通过 `marks` 中的 `_key` 引用
#[derive(Debug, Clone, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// 决定使用哪个序列化器的块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading1,
    Heading2,
    ListItem(ListKind),
    Default,
}

impl TextBlock {
    pub fn kind(&self) -> BlockKind {
        if let Some(list) = self.list_item {
            return BlockKind::ListItem(list);
        }
        match self.style.as_deref() {
            Some("h1") => BlockKind::Heading1,
            Some("h2") => BlockKind::Heading2,
            _ => BlockKind::Default,
        }
    }
}

/// 将富文本块渲染为 HTML
///
/// 严格保持块与子节点的顺序；连续的列表项会包裹在同一个 `<ul>`/`<ol>` 中，
/// 层级更深的列表项嵌套在上一层的 `<li>` 里。
pub fn render_blocks(blocks: &[Block], images: &ImageUrlBuilder) -> String {
    let mut html = String::new();
    let mut lists = ListStack::default();

    for block in blocks {
        match block {
            Block::Text(text) => {
                match text.list_item {
                    Some(kind) => lists.enter_item(kind, text.level.unwrap_or(1), &mut html),
                    None => lists.close_all(&mut html),
                }
                serialize_text_block(text, &mut html);
            }
            Block::Image(image) => {
                lists.close_all(&mut html);
                serialize_image(image, images, &mut html);
            }
            Block::Unknown => tracing::debug!("skip block without serializer"),
        }
    }

    lists.close_all(&mut html);
    html
}

/// 当前打开的列表，每层记录列表类型以及该层是否有未闭合的 `<li>`
#[derive(Debug, Default)]
struct ListStack {
    levels: Vec<(ListKind, bool)>,
}

impl ListStack {
    /// 为下一个列表项调整嵌套，调用后由序列化器写出 `<li>` 开标签
    fn enter_item(&mut self, kind: ListKind, level: usize, html: &mut String) {
        let level = level.max(1);

        while self.levels.len() > level {
            self.close_one(html);
        }
        if self.levels.len() == level {
            if self.levels.last().is_some_and(|(open, _)| *open == kind) {
                if let Some((_, item_open)) = self.levels.last_mut() {
                    if *item_open {
                        html.push_str("</li>");
                        *item_open = false;
                    }
                }
            } else {
                self.close_one(html);
            }
        }
        while self.levels.len() < level {
            html.push_str(list_open(kind));
            self.levels.push((kind, false));
        }

        if let Some((_, item_open)) = self.levels.last_mut() {
            *item_open = true;
        }
    }

    fn close_one(&mut self, html: &mut String) {
        if let Some((kind, item_open)) = self.levels.pop() {
            if item_open {
                html.push_str("</li>");
            }
            html.push_str(list_close(kind));
        }
    }

    fn close_all(&mut self, html: &mut String) {
        while !self.levels.is_empty() {
            self.close_one(html);
        }
    }
}

fn list_open(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Number => "<ol>",
        ListKind::Bullet | ListKind::Other => "<ul>",
    }
}

fn list_close(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Number => "</ol>",
        ListKind::Bullet | ListKind::Other => "</ul>",
    }
}

fn serialize_text_block(block: &TextBlock, html: &mut String) {
    let children = serialize_children(block);

    match block.kind() {
        BlockKind::Heading1 => {
            html.push_str(r#"<h1 class="text-2xl font-bold my-5">"#);
            html.push_str(&children);
            html.push_str("</h1>");
        }
        BlockKind::Heading2 => {
            html.push_str(r#"<h2 class="text-2xl font-bold my-5">"#);
            html.push_str(&children);
            html.push_str("</h2>");
        }
        // `</li>` 由 ListStack 写出，嵌套列表需要放在它之前
        BlockKind::ListItem(ListKind::Number) => {
            html.push_str(r#"<li class="ml-4 list-decimal">"#);
            html.push_str(&children);
        }
        BlockKind::ListItem(_) => {
            html.push_str(r#"<li class="ml-4 list-disc">"#);
            html.push_str(&children);
        }
        BlockKind::Default => serialize_default(block.style.as_deref(), &children, html),
    }
}

/// 其他样式的默认渲染
fn serialize_default(style: Option<&str>, children: &str, html: &mut String) {
    let tag = match style {
        Some(s @ ("h3" | "h4" | "h5" | "h6")) => s,
        Some("blockquote") => "blockquote",
        _ => "p",
    };
    html.push('<');
    html.push_str(tag);
    html.push('>');
    html.push_str(children);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn serialize_children(block: &TextBlock) -> String {
    let mut out = String::new();
    for child in &block.children {
        match child {
            Inline::Span(span) => serialize_span(span, &block.mark_defs, &mut out),
            Inline::Unknown => {}
        }
    }
    out
}

fn serialize_span(span: &Span, mark_defs: &[MarkDef], out: &mut String) {
    let mut closing = Vec::with_capacity(span.marks.len());

    for mark in &span.marks {
        match mark.as_str() {
            "strong" => push_tag(out, &mut closing, "<strong>", "</strong>"),
            "em" => push_tag(out, &mut closing, "<em>", "</em>"),
            "code" => push_tag(out, &mut closing, "<code>", "</code>"),
            "underline" => push_tag(
                out,
                &mut closing,
                r#"<span style="text-decoration: underline">"#,
                "</span>",
            ),
            "strike-through" => push_tag(out, &mut closing, "<del>", "</del>"),
            key => {
                let link = mark_defs
                    .iter()
                    .find(|def| def.key == key && def.kind == "link");
                if let Some(def) = link {
                    serialize_link_open(def.href.as_deref().unwrap_or_default(), out);
                    closing.push("</a>");
                }
            }
        }
    }

    for (i, line) in span.text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br/>");
        }
        out.push_str(&escape_text(line));
    }

    for tag in closing.iter().rev() {
        out.push_str(tag);
    }
}

fn push_tag(out: &mut String, closing: &mut Vec<&'static str>, open: &str, close: &'static str) {
    out.push_str(open);
    closing.push(close);
}

/// 超链接，保留目标地址
fn serialize_link_open(href: &str, out: &mut String) {
    out.push_str(r#"<a href=""#);
    out.push_str(&escape_attribute(href));
    out.push_str(r#"" class="text-blue-500 hover:underline">"#);
}

fn serialize_image(image: &ImageRef, images: &ImageUrlBuilder, html: &mut String) {
    let Some(url) = images.url_for(image) else {
        tracing::debug!("skip image block without asset");
        return;
    };
    html.push_str(r#"<img class="my-5" src=""#);
    html.push_str(&escape_attribute(&url));
    html.push_str(r#"" alt=""#);
    html.push_str(&escape_attribute(image.alt.as_deref().unwrap_or_default()));
    html.push_str(r#"" />"#);
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn images() -> ImageUrlBuilder {
        ImageUrlBuilder::new("abc123", "production")
    }

    fn blocks(value: serde_json::Value) -> Vec<Block> {
        serde_json::from_value(value).expect("反序列化失败")
    }

    fn text_block(style: &str, text: &str) -> serde_json::Value {
        json!({
            "_type": "block",
            "style": style,
            "markDefs": [],
            "children": [{ "_type": "span", "text": text, "marks": [] }]
        })
    }

    #[test]
    fn test_heading_serializers() {
        let html = render_blocks(
            &blocks(json!([text_block("h1", "Hi"), text_block("h2", "There")])),
            &images(),
        );

        assert_eq!(
            html,
            r#"<h1 class="text-2xl font-bold my-5">Hi</h1><h2 class="text-2xl font-bold my-5">There</h2>"#
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let html = render_blocks(
            &blocks(json!([
                text_block("normal", "A"),
                text_block("h3", "B"),
                text_block("h1", "C")
            ])),
            &images(),
        );

        let a = html.find('A').expect("缺少 A");
        let b = html.find('B').expect("缺少 B");
        let c = html.find('C').expect("缺少 C");
        assert!(a < b && b < c, "渲染结果顺序错误: {html}");
        assert!(html.starts_with("<p>A</p><h3>B</h3>"));
    }

    #[test]
    fn test_list_items_are_grouped() {
        let mut first = text_block("normal", "one");
        first["listItem"] = json!("bullet");
        let mut second = text_block("normal", "two");
        second["listItem"] = json!("bullet");
        let mut third = text_block("normal", "three");
        third["listItem"] = json!("number");

        let html = render_blocks(
            &blocks(json!([first, second, third, text_block("normal", "after")])),
            &images(),
        );

        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">one</li><li class="ml-4 list-disc">two</li></ul>"#,
                r#"<ol><li class="ml-4 list-decimal">three</li></ol>"#,
                "<p>after</p>"
            )
        );
    }

    fn list_item(kind: &str, level: u32, text: &str) -> serde_json::Value {
        let mut block = text_block("normal", text);
        block["listItem"] = json!(kind);
        block["level"] = json!(level);
        block
    }

    #[test]
    fn test_nested_list_items() {
        let html = render_blocks(
            &blocks(json!([
                list_item("bullet", 1, "outer"),
                list_item("bullet", 2, "inner"),
                list_item("bullet", 1, "outer2")
            ])),
            &images(),
        );

        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">outer"#,
                r#"<ul><li class="ml-4 list-disc">inner</li></ul>"#,
                r#"</li><li class="ml-4 list-disc">outer2</li></ul>"#
            )
        );
    }

    #[test]
    fn test_nested_list_of_other_kind() {
        let html = render_blocks(
            &blocks(json!([
                list_item("bullet", 1, "a"),
                list_item("number", 2, "a.1"),
                list_item("number", 2, "a.2"),
                text_block("normal", "after")
            ])),
            &images(),
        );

        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">a"#,
                r#"<ol><li class="ml-4 list-decimal">a.1</li><li class="ml-4 list-decimal">a.2</li></ol>"#,
                r#"</li></ul><p>after</p>"#
            )
        );
    }

    #[test]
    fn test_link_keeps_href_and_children() {
        let html = render_blocks(
            &blocks(json!([{
                "_type": "block",
                "style": "normal",
                "markDefs": [{ "_key": "k1", "_type": "link", "href": "https://example.com/?a=1&b=2" }],
                "children": [
                    { "_type": "span", "text": "see ", "marks": [] },
                    { "_type": "span", "text": "here", "marks": ["strong", "k1"] }
                ]
            }])),
            &images(),
        );

        assert_eq!(
            html,
            r#"<p>see <strong><a href="https://example.com/?a=1&amp;b=2" class="text-blue-500 hover:underline">here</a></strong></p>"#
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_blocks(
            &blocks(json!([text_block("normal", "<script>x & y</script>\nnext")])),
            &images(),
        );

        assert_eq!(html, "<p>&lt;script&gt;x &amp; y&lt;/script&gt;<br/>next</p>");
    }

    #[test]
    fn test_unknown_blocks_render_nothing() {
        let html = render_blocks(
            &blocks(json!([
                { "_type": "code", "code": "fn main() {}" },
                text_block("normal", "kept"),
                { "_type": "block", "children": [{ "_type": "mention", "user": "x" }] }
            ])),
            &images(),
        );

        assert_eq!(html, "<p>kept</p><p></p>");
    }

    #[test]
    fn test_image_block() {
        let html = render_blocks(
            &blocks(json!([{
                "_type": "image",
                "alt": "cover",
                "asset": { "_ref": "image-abc-10x20-png", "_type": "reference" }
            }])),
            &images(),
        );

        assert_eq!(
            html,
            r#"<img class="my-5" src="https://cdn.sanity.io/images/abc123/production/abc-10x20.png" alt="cover" />"#
        );
    }
}
