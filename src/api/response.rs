//! 响应包络与错误边界
//!
//! 所有 JSON 响应使用统一包络 `{ success, data?, message?, error? }`；
//! AppError 在此统一翻译为 HTTP 状态码。

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::utils::error::AppError;

/// 错误体
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// 统一响应包络
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiErrorBody {
                message: message.into(),
            }),
        }
    }
}

/// 200 + 数据包络
pub fn json_ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::data(data))).into_response()
}

/// 201 + 数据包络
pub fn json_created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::data(data))).into_response()
}

/// 200 + 纯消息包络
pub fn json_message(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::message(message))).into_response()
}

/// 用已序列化好的包络字符串构造 200 响应（缓存命中路径）
pub fn json_body(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

impl AppError {
    /// 错误到 HTTP 状态码的映射
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("内部错误: {}", self);
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
