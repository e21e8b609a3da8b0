use super::ImageRef;

const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// 图片地址构建器
///
/// 将 `image-<id>-<宽>x<高>-<格式>` 形式的资源引用解析为 CDN 地址。
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// 返回图片的 CDN 地址，引用缺失或格式不正确时返回 `None`
    pub fn url_for(&self, image: &ImageRef) -> Option<String> {
        let asset = image.asset.as_ref()?;
        let (file, format) = parse_asset_ref(&asset.id)?;
        Some(format!(
            "{}/{}/{}/{}.{}",
            IMAGE_CDN, self.project_id, self.dataset, file, format
        ))
    }

    /// [`url_for`](Self::url_for) 的便捷形式，缺失时返回空字符串
    pub fn url_or_empty(&self, image: Option<&ImageRef>) -> String {
        image.and_then(|i| self.url_for(i)).unwrap_or_default()
    }
}

/// 拆分资源引用，返回 (`<id>-<宽>x<高>`, 格式)
fn parse_asset_ref(asset_ref: &str) -> Option<(&str, &str)> {
    let rest = asset_ref.strip_prefix("image-")?;
    let (file, format) = rest.rsplit_once('-')?;
    let (_, dimensions) = file.rsplit_once('-')?;
    let (w, h) = dimensions.split_once('x')?;

    if w.parse::<u32>().is_err() || h.parse::<u32>().is_err() || format.is_empty() {
        return None;
    }
    Some((file, format))
}
