use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::AppError;
use crate::services::decode_cache::DecodeCache;

// Thumbnails fit inside a square of this edge.
const THUMBNAIL_SIZE: u32 = 256;

// One file through the thumbnail stage: shared decode, bounded-box resize,
// JPEG on disk named by file id. Returns the decoded source dimensions for
// the store. The path must already be booked in the cache.
pub async fn thumbnail_file(
    cache: &DecodeCache,
    path: &Path,
    thumbs_dir: &Path,
    file_id: i64,
) -> Result<(u32, u32), AppError> {
    let img = cache.load(path).await?;
    let (width, height) = img.dimensions();

    std::fs::create_dir_all(thumbs_dir)?;
    let full = DynamicImage::ImageRgba8((*img).clone());
    let thumb = if width > THUMBNAIL_SIZE || height > THUMBNAIL_SIZE {
        full.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
    } else {
        full
    };
    thumb.to_rgb8().save(thumbs_dir.join(format!("{file_id}.jpg")))?;

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([90, 120, 200, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_thumbnail_reports_source_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 640, 360);
        let thumbs = dir.path().join("thumbs");

        let cache = DecodeCache::new();
        cache.book([path.clone()]);

        let (w, h) = thumbnail_file(&cache, &path, &thumbs, 7).await.unwrap();
        assert_eq!((w, h), (640, 360));

        let thumb = image::open(thumbs.join("7.jpg")).unwrap();
        assert_eq!(thumb.width(), THUMBNAIL_SIZE);
        assert!(thumb.height() <= THUMBNAIL_SIZE, "aspect ratio must be kept");
    }

    #[tokio::test]
    async fn test_small_image_is_not_upscaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tiny.png", 32, 32);
        let thumbs = dir.path().join("thumbs");

        let cache = DecodeCache::new();
        cache.book([path.clone()]);

        thumbnail_file(&cache, &path, &thumbs, 3).await.unwrap();
        let thumb = image::open(thumbs.join("3.jpg")).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (32, 32));
    }
}
