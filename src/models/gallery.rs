//! 画廊数据模型

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 画廊
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    /// 画廊ID
    pub gallery_id: i64,
    /// 画廊名
    pub name: String,
    /// URL 标识（由名称派生，全库唯一）
    pub slug: String,
    /// 描述
    pub description: Option<String>,
    /// 成员图片数量（冗余计数，与成员列表保持一致）
    pub image_count: i64,
    /// 封面图片ID
    pub cover_image_id: Option<i64>,
    /// 创建时间
    pub created_at: String,
    /// 更新时间
    pub updated_at: String,
}

/// 用于创建新画廊的输入结构
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGallery {
    /// 缺失与空串同样按"名称不能为空"拒绝
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

/// 用于更新画廊的输入结构
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGallery {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// 画廊成员图片摘要（列表/详情响应中内联的字段子集）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageSummary {
    pub image_id: i64,
    pub original_name: String,
    pub file_path: String,
    pub thumbnail_path: String,
    pub file_size: i64,
    pub description: String,
}

/// 带成员图片的画廊
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryWithImages {
    #[serde(flatten)]
    pub gallery: Gallery,
    /// 成员图片（按画廊内排序）
    pub images: Vec<GalleryImageSummary>,
}

/// 由画廊名派生 slug：小写后，所有非 [a-z0-9] 的连续字符段替换为单个 '-'
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new("[^a-z0-9]+").expect("slug 正则无效"));
    re.replace_all(&name.to_lowercase(), "-").into_owned()
}
