//! 上传文件静态服务
//!
//! 以宽松跨域头直接回源原图与缩略图

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::utils::error::{AppError, AppResult};

use super::AppState;

/// GET /uploads/*path
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let abs = state
        .store
        .resolve(&path)
        .ok_or_else(|| AppError::InvalidInput("文件路径无效".to_string()))?;

    let bytes = match tokio::fs::read(&abs).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("文件 {}", path)));
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (
                header::HeaderName::from_static("cross-origin-resource-policy"),
                "cross-origin",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// 按扩展名推断 Content-Type
fn content_type_for(path: &str) -> &'static str {
    match std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("thumbnails/thumb-x.png"), "image/png");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
