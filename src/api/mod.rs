//! GalleryWall HTTP 接口模块
//!
//! 路由装配、应用状态与跨域处理

pub mod files;
pub mod galleries;
pub mod images;
pub mod response;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::db::Database;
use crate::services::{LibraryService, MediaStore, ResponseCache};
use crate::utils::error::{AppError, AppResult};

use response::json_ok;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub library: Arc<LibraryService>,
    pub cache: Arc<ResponseCache>,
    pub store: MediaStore,
    /// 上传大小上限（字节），同时决定请求体上限
    pub max_upload_bytes: usize,
}

/// 解析路径/查询中的记录 ID
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("{} ID 无效: {}", what, raw)))
}

/// GET /healthz
async fn healthz(State(state): State<AppState>) -> AppResult<Response> {
    let stats = state.db.stats()?;
    Ok(json_ok(stats))
}

/// 跨域响应头
fn apply_cors_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PATCH, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

/// 跨域中间件：预检直接应答，其余请求补充响应头
async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&mut response);
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(&mut response);
    response
}

/// 装配路由
pub fn build_router(state: AppState) -> Router {
    // 请求体上限略高于文件上限，留出表单其他字段的余量；
    // 精确的 5 MiB 校验在上传流程内完成并返回 400
    let body_limit = state.max_upload_bytes * 2;

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/images",
            get(images::get_images).post(images::upload_image),
        )
        .route(
            "/api/images/:id",
            get(images::get_image)
                .patch(images::update_image)
                .delete(images::delete_image),
        )
        .route(
            "/api/galleries",
            get(galleries::get_galleries).post(galleries::create_gallery),
        )
        .route(
            "/api/galleries/:id",
            get(galleries::get_gallery)
                .patch(galleries::update_gallery)
                .delete(galleries::delete_gallery),
        )
        .route("/uploads/*path", get(files::serve_upload))
        .layer(middleware::from_fn(cors))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
