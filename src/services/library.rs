//! 图库服务
//!
//! 编排上传、归属变更与删除的完整流程：
//! 文件落盘、缩略图派生、记录写入的顺序以及失败时的清理。

use std::sync::Arc;

use crate::db::Database;
use crate::models::{
    image::UpdateImage, parse_tags, CreateImage, ImageWithGallery,
};
use crate::utils::error::{AppError, AppResult};

use super::metadata::MetadataExtractor;
use super::storage::MediaStore;
use super::thumbnail::ThumbnailService;

/// 允许上传的 MIME 类型
pub const ALLOWED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// 上传请求
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// 文件内容
    pub data: Vec<u8>,
    /// 客户端提供的原始文件名
    pub original_name: String,
    /// 客户端声明的 MIME 类型
    pub mime_type: String,
    /// 显示名（缺省回退为原始文件名）
    pub name: Option<String>,
    pub description: Option<String>,
    /// 逗号分隔的标签串
    pub tags: Option<String>,
    /// 目标画廊
    pub gallery_id: Option<i64>,
}

/// 图库服务
#[derive(Clone)]
pub struct LibraryService {
    db: Arc<Database>,
    store: MediaStore,
    /// 上传大小上限（字节）
    max_upload_bytes: usize,
}

impl LibraryService {
    pub fn new(db: Arc<Database>, store: MediaStore, max_upload_bytes: usize) -> Self {
        Self {
            db,
            store,
            max_upload_bytes,
        }
    }

    /// 上传图片
    ///
    /// 顺序：校验 → 原图落盘 → 缩略图 → 元数据 → 记录写入（含画廊侧同步）。
    /// 原图落盘之后的任何失败都会清理已写入的文件再返回原始错误。
    pub fn upload(&self, req: UploadRequest) -> AppResult<ImageWithGallery> {
        if req.data.is_empty() {
            return Err(AppError::InvalidInput("未提供图片文件".to_string()));
        }
        if !ALLOWED_MIME_TYPES.contains(&req.mime_type.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "不支持的文件类型: {}，仅允许 JPEG/PNG/GIF/WebP",
                req.mime_type
            )));
        }
        if req.data.len() > self.max_upload_bytes {
            return Err(AppError::InvalidInput(format!(
                "文件超过大小上限 {} 字节",
                self.max_upload_bytes
            )));
        }

        let file_name = MediaStore::generate_file_name(&req.original_name);
        self.store.save_original(&file_name, &req.data)?;

        match self.ingest(&file_name, &req) {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::warn!("上传失败，清理已写入文件: {}", e);
                self.cleanup_failed_upload(&file_name);
                Err(e)
            }
        }
    }

    /// 原图落盘之后的步骤：缩略图、元数据、记录
    fn ingest(&self, file_name: &str, req: &UploadRequest) -> AppResult<ImageWithGallery> {
        let original_abs = self.store.original_abs(file_name);
        let thumbnail_abs = self.store.thumbnail_abs(file_name);

        ThumbnailService::generate(&original_abs, &thumbnail_abs)?;

        // 从落盘后的原图读回固有元数据
        let metadata = MetadataExtractor::probe(&original_abs)?;

        let create = CreateImage {
            file_name: file_name.to_string(),
            original_name: req
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| req.original_name.clone()),
            file_path: MediaStore::original_rel(file_name),
            thumbnail_path: MediaStore::thumbnail_rel(file_name),
            file_size: req.data.len() as i64,
            mime_type: req.mime_type.clone(),
            description: req.description.clone().unwrap_or_default(),
            tags: req.tags.as_deref().map(parse_tags).unwrap_or_default(),
            gallery_id: req.gallery_id,
            width: Some(i64::from(metadata.width)),
            height: Some(i64::from(metadata.height)),
            format: Some(metadata.format),
        };

        let image = self.db.create_image(&create)?;
        tracing::info!(
            "上传完成: {} ({} 字节, {:?})",
            image.file_name,
            image.file_size,
            image.gallery_id
        );

        self.db
            .get_image_with_gallery(image.image_id)?
            .ok_or_else(|| AppError::General("插入后未能读回图片".to_string()))
    }

    /// 清理失败上传留下的文件；清理失败只记录日志，不覆盖原始错误
    fn cleanup_failed_upload(&self, file_name: &str) {
        if let Err(e) = self.store.delete_original(file_name) {
            tracing::warn!("清理原图失败: {}: {}", file_name, e);
        }
        if let Err(e) = self.store.delete_thumbnail(file_name) {
            tracing::warn!("清理缩略图失败: {}: {}", file_name, e);
        }
    }

    /// 更新图片（字段合并 + 归属变更），返回带画廊名的结果
    pub fn update_image(&self, image_id: i64, update: &UpdateImage) -> AppResult<ImageWithGallery> {
        let image = self.db.update_image(image_id, update)?;
        self.db
            .get_image_with_gallery(image.image_id)?
            .ok_or_else(|| AppError::General("更新后未能读回图片".to_string()))
    }

    /// 删除图片：记录删除成功后尽力删除磁盘文件
    ///
    /// 记录是权威数据，文件删除失败不阻塞、只记录日志。
    pub fn delete_image(&self, image_id: i64) -> AppResult<()> {
        let image = self.db.delete_image(image_id)?;

        if let Err(e) = self.store.delete_original(&image.file_name) {
            tracing::warn!("删除原图失败: {}: {}", image.file_name, e);
        }
        if let Err(e) = self.store.delete_thumbnail(&image.file_name) {
            tracing::warn!("删除缩略图失败: {}: {}", image.file_name, e);
        }

        tracing::info!("图片已删除: {}", image.file_name);
        Ok(())
    }

    /// 删除画廊：成员图片先解除归属，画廊记录随后移除
    pub fn delete_gallery(&self, gallery_id: i64) -> AppResult<()> {
        if !self.db.delete_gallery(gallery_id)? {
            return Err(AppError::NotFound(format!("画廊 {}", gallery_id)));
        }
        tracing::info!("画廊已删除: {}", gallery_id);
        Ok(())
    }
}
