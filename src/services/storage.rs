//! 媒体文件存储服务
//!
//! 管理上传目录中的原图与缩略图文件

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::utils::error::AppResult;

/// 缩略图文件名前缀
pub const THUMBNAIL_PREFIX: &str = "thumb-";

/// 媒体文件存储
#[derive(Clone)]
pub struct MediaStore {
    /// 上传根目录
    uploads_dir: PathBuf,
}

impl MediaStore {
    /// 创建媒体存储，确保目录结构存在
    pub fn new(uploads_dir: PathBuf) -> AppResult<Self> {
        let thumbnails = uploads_dir.join("thumbnails");
        if !thumbnails.exists() {
            fs::create_dir_all(&thumbnails)?;
            tracing::info!("创建上传目录: {:?}", uploads_dir);
        }
        Ok(Self { uploads_dir })
    }

    /// 获取默认上传目录
    pub fn default_uploads_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("GalleryWall")
            .join("uploads")
    }

    /// 生成唯一存储文件名：16 字节随机数的十六进制编码 + 原扩展名
    pub fn generate_file_name(original_name: &str) -> String {
        let unique = uuid::Uuid::new_v4().simple().to_string();
        match Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{}", unique, ext.to_lowercase()),
            None => unique,
        }
    }

    /// 原图的磁盘绝对路径
    pub fn original_abs(&self, file_name: &str) -> PathBuf {
        self.uploads_dir.join(file_name)
    }

    /// 缩略图的磁盘绝对路径
    pub fn thumbnail_abs(&self, file_name: &str) -> PathBuf {
        self.uploads_dir
            .join("thumbnails")
            .join(format!("{}{}", THUMBNAIL_PREFIX, file_name))
    }

    /// 原图的记录路径（相对路径，前端据此拼接 URL）
    pub fn original_rel(file_name: &str) -> String {
        format!("uploads/{}", file_name)
    }

    /// 缩略图的记录路径
    pub fn thumbnail_rel(file_name: &str) -> String {
        format!("uploads/thumbnails/{}{}", THUMBNAIL_PREFIX, file_name)
    }

    /// 写入原图文件
    pub fn save_original(&self, file_name: &str, data: &[u8]) -> AppResult<PathBuf> {
        let path = self.original_abs(file_name);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// 删除原图文件（文件不存在视为已删除）
    pub fn delete_original(&self, file_name: &str) -> AppResult<()> {
        let path = self.original_abs(file_name);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("删除原图: {:?}", path);
        }
        Ok(())
    }

    /// 删除缩略图文件（文件不存在视为已删除）
    pub fn delete_thumbnail(&self, file_name: &str) -> AppResult<()> {
        let path = self.thumbnail_abs(file_name);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("删除缩略图: {:?}", path);
        }
        Ok(())
    }

    /// 将请求中的相对路径解析为上传目录内的绝对路径
    ///
    /// 含有越界成分（`..`、根路径等）的请求返回 None。
    pub fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let rel_path = Path::new(rel);
        for component in rel_path.components() {
            match component {
                Component::Normal(_) => {}
                _ => return None,
            }
        }
        Some(self.uploads_dir.join(rel_path))
    }
}
