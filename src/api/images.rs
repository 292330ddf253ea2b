//! 图片接口处理器

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::image::UpdateImage;
use crate::services::UploadRequest;
use crate::utils::error::{AppError, AppResult};

use super::response::{json_created, json_message, json_ok};
use super::{parse_id, AppState};

/// 图片列表查询参数
#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    /// 按画廊过滤
    pub gallery: Option<String>,
}

/// POST /api/images（multipart 表单）
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut data: Option<Vec<u8>> = None;
    let mut original_name = String::new();
    let mut mime_type = String::new();
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut tags: Option<String> = None;
    let mut gallery_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("表单解析失败: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "image" => {
                original_name = field.file_name().unwrap_or("upload").to_string();
                mime_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("读取上传内容失败: {}", e)))?;
                data = Some(bytes.to_vec());
            }
            "name" => name = read_text(field).await?,
            "description" => description = read_text(field).await?,
            "tags" => tags = read_text(field).await?,
            "galleryId" => {
                if let Some(raw) = read_text(field).await? {
                    gallery_id = Some(parse_id(&raw, "画廊")?);
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("未提供图片文件".to_string()))?;

    let image = state.library.upload(UploadRequest {
        data,
        original_name,
        mime_type,
        name,
        description,
        tags,
        gallery_id,
    })?;
    state.cache.invalidate_all();

    Ok(json_created(image))
}

/// 读取文本字段，空串视为未提供
async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("表单解析失败: {}", e)))?;
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// GET /api/images
pub async fn get_images(
    State(state): State<AppState>,
    Query(query): Query<ImagesQuery>,
) -> AppResult<Response> {
    let gallery_id = match query.gallery.as_deref().filter(|g| !g.is_empty()) {
        Some(raw) => Some(parse_id(raw, "画廊")?),
        None => None,
    };

    let images = state.db.get_images(gallery_id)?;
    Ok(json_ok(images))
}

/// GET /api/images/:id
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let image_id = parse_id(&id, "图片")?;

    let image = state
        .db
        .get_image_with_gallery(image_id)?
        .ok_or_else(|| AppError::NotFound(format!("图片 {}", image_id)))?;
    Ok(json_ok(image))
}

/// PATCH /api/images/:id
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateImage>,
) -> AppResult<Response> {
    let image_id = parse_id(&id, "图片")?;

    let image = state.library.update_image(image_id, &body)?;
    state.cache.invalidate_all();
    Ok(json_ok(image))
}

/// DELETE /api/images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let image_id = parse_id(&id, "图片")?;

    state.library.delete_image(image_id)?;
    state.cache.invalidate_all();
    Ok(json_message("图片删除成功"))
}
