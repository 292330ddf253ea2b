//! 元数据提取服务
//!
//! 从已落盘的原图读取像素尺寸与编码格式

use std::path::Path;

use image::ImageFormat;

use crate::utils::error::{AppError, AppResult};

/// 图片固有元数据
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// 像素宽度
    pub width: u32,
    /// 像素高度
    pub height: u32,
    /// 编码格式（jpeg/png/gif/webp）
    pub format: String,
}

/// 元数据提取器
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// 从文件内容探测尺寸与格式（按字节嗅探，不信任扩展名）
    pub fn probe(path: &Path) -> AppResult<ImageMetadata> {
        let reader = image::ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| AppError::InvalidInput("无法识别的图片格式".to_string()))?;
        let (width, height) = reader.into_dimensions()?;

        Ok(ImageMetadata {
            width,
            height,
            format: Self::format_name(format).to_string(),
        })
    }

    /// 格式的规范名称
    fn format_name(format: ImageFormat) -> &'static str {
        match format {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            _ => "unknown",
        }
    }
}
