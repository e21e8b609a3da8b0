use std::path::Path;

use crate::{
    comment::SubmissionState,
    content::{ContentSource, ImageUrlBuilder},
    error::Result,
    generator::{PageGenerator, PageProps, StaticPaths},
    page,
};

/// 导出全部文章页面为静态文件
///
/// 每篇文章写入 `<out_dir>/post/<slug>/index.html`，返回写入的页面数。
pub async fn export_site<S: ContentSource>(
    generator: &PageGenerator<S>,
    images: &ImageUrlBuilder,
    out_dir: &Path,
) -> Result<usize> {
    let StaticPaths { paths, .. } = generator.static_paths().await?;
    let mut written = 0;

    for params in paths {
        let slug = params.slug.as_str();
        if !is_safe_segment(slug) {
            tracing::warn!(slug, "skip slug that is not a single path segment");
            continue;
        }

        match generator.static_props(slug).await? {
            PageProps::Found { post, .. } => {
                let html = page::render_post(&post, images, &SubmissionState::default(), None)?;
                let dir = out_dir.join("post").join(slug);
                tokio::fs::create_dir_all(&dir).await?;
                tokio::fs::write(dir.join("index.html"), html).await?;
                written += 1;
            }
            PageProps::NotFound => tracing::warn!(slug, "post disappeared during export"),
        }
    }

    Ok(written)
}

fn is_safe_segment(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}
