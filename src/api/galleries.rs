//! 画廊接口处理器

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::models::{CreateGallery, UpdateGallery};
use crate::utils::error::{AppError, AppResult};

use super::response::{json_body, json_created, json_message, json_ok, ApiResponse};
use super::{parse_id, AppState};

/// POST /api/galleries
pub async fn create_gallery(
    State(state): State<AppState>,
    Json(body): Json<CreateGallery>,
) -> AppResult<Response> {
    let gallery = state.db.create_gallery(&body)?;
    state.cache.invalidate_all();
    Ok(json_created(gallery))
}

/// GET /api/galleries
pub async fn get_galleries(State(state): State<AppState>) -> AppResult<Response> {
    let key = "/api/galleries";
    if let Some(body) = state.cache.get(key) {
        return Ok(json_body(body));
    }

    let galleries = state.db.get_all_galleries_with_images()?;
    let envelope = ApiResponse::data(galleries);
    let body = serde_json::to_string(&envelope)
        .map_err(|e| AppError::General(format!("响应序列化失败: {}", e)))?;
    state.cache.insert(key.to_string(), body.clone());
    Ok(json_body(body))
}

/// GET /api/galleries/:id
pub async fn get_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let gallery_id = parse_id(&id, "画廊")?;

    let key = format!("/api/galleries/{}", gallery_id);
    if let Some(body) = state.cache.get(&key) {
        return Ok(json_body(body));
    }

    let gallery = state
        .db
        .get_gallery_with_images(gallery_id)?
        .ok_or_else(|| AppError::NotFound(format!("画廊 {}", gallery_id)))?;

    let envelope = ApiResponse::data(gallery);
    let body = serde_json::to_string(&envelope)
        .map_err(|e| AppError::General(format!("响应序列化失败: {}", e)))?;
    state.cache.insert(key, body.clone());
    Ok(json_body(body))
}

/// PATCH /api/galleries/:id
pub async fn update_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateGallery>,
) -> AppResult<Response> {
    let gallery_id = parse_id(&id, "画廊")?;

    if !state.db.update_gallery(gallery_id, &body)? {
        return Err(AppError::NotFound(format!("画廊 {}", gallery_id)));
    }
    state.cache.invalidate_all();

    let gallery = state
        .db
        .get_gallery_with_images(gallery_id)?
        .ok_or_else(|| AppError::NotFound(format!("画廊 {}", gallery_id)))?;
    Ok(json_ok(gallery))
}

/// DELETE /api/galleries/:id
pub async fn delete_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let gallery_id = parse_id(&id, "画廊")?;

    state.library.delete_gallery(gallery_id)?;
    state.cache.invalidate_all();
    Ok(json_message("画廊删除成功"))
}
