//! 缩略图生成服务
//!
//! 上传时生成固定尺寸的裁剪缩略图

use std::fs;
use std::path::Path;

use image::imageops::FilterType;

use crate::utils::error::AppResult;

/// 缩略图边长（像素）
pub const THUMBNAIL_SIZE: u32 = 200;

/// 缩略图服务
pub struct ThumbnailService;

impl ThumbnailService {
    /// 从原图生成 200x200 的覆盖式裁剪缩略图
    ///
    /// 输出格式由目标路径的扩展名决定（与原图一致）。
    pub fn generate(source: &Path, dest: &Path) -> AppResult<()> {
        let img = image::open(source)?;
        let thumbnail = img.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        thumbnail.save(dest)?;

        tracing::debug!("生成缩略图: {:?} -> {:?}", source, dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_image(path: &Path, width: u32, height: u32) {
        let img = image::DynamicImage::new_rgb8(width, height);
        img.save(path).unwrap();
    }

    #[test]
    fn test_thumbnail_is_exactly_square() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.png");
        let dest = dir.path().join("thumbnails").join("thumb-source.png");

        // 非正方形原图也裁剪为 200x200
        create_test_image(&source, 640, 360);

        ThumbnailService::generate(&source, &dest).unwrap();
        assert!(dest.exists());

        let (w, h) = image::image_dimensions(&dest).unwrap();
        assert_eq!(w, THUMBNAIL_SIZE);
        assert_eq!(h, THUMBNAIL_SIZE);
    }

    #[test]
    fn test_generate_fails_on_garbage() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let dest = dir.path().join("thumb-broken.jpg");
        assert!(ThumbnailService::generate(&source, &dest).is_err());
        assert!(!dest.exists());
    }
}
