//! 图片数据模型

use serde::{Deserialize, Serialize};

/// 图片记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// 图片ID
    pub image_id: i64,
    /// 存储文件名（上传时生成的唯一名）
    pub file_name: String,
    /// 原始文件名
    pub original_name: String,
    /// 原图存储路径（相对路径，如 uploads/xxx.jpg）
    pub file_path: String,
    /// 缩略图存储路径
    pub thumbnail_path: String,
    /// 文件大小（字节）
    pub file_size: i64,
    /// MIME 类型
    pub mime_type: String,
    /// 描述
    pub description: String,
    /// 标签列表
    pub tags: Vec<String>,
    /// 所属画廊ID（可为空）
    pub gallery_id: Option<i64>,
    /// 像素宽度
    pub width: Option<i64>,
    /// 像素高度
    pub height: Option<i64>,
    /// 编码格式（jpeg/png/gif/webp）
    pub format: Option<String>,
    /// 创建时间
    pub created_at: String,
    /// 更新时间
    pub updated_at: String,
}

/// 用于创建新图片记录的输入结构
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub thumbnail_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub description: String,
    pub tags: Vec<String>,
    pub gallery_id: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub format: Option<String>,
}

/// 用于更新图片的输入结构
///
/// `gallery_id` 区分三种情况：字段缺失 = 不改动归属，
/// 显式 null = 移出画廊，给定ID = 移入该画廊。
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImage {
    /// 显示名（写入 original_name）
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gallery_id: Option<Option<i64>>,
}

/// 区分"字段存在且为 null"与"字段缺失"：存在的字段总是包成 Some
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// 画廊引用（仅携带名称，用于图片响应中的归属展示）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRef {
    pub gallery_id: i64,
    pub name: String,
}

/// 带画廊名称的图片
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageWithGallery {
    #[serde(flatten)]
    pub image: Image,
    /// 所属画廊（已解析名称）
    pub gallery: Option<GalleryRef>,
}

/// 解析逗号分隔的标签串：按逗号拆分并去除首尾空白，丢弃空项
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// 获取当前 UTC 时间的 ISO 8601 字符串
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
