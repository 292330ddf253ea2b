//! GalleryWall - 图库管理服务
//!
//! 基于 axum + SQLite 构建：图片上传、画廊组织与归属调整的 REST 服务

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use api::{build_router, AppState};
pub use config::AppConfig;
