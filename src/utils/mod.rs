//! GalleryWall 工具模块

pub mod error;

pub use error::{AppError, AppResult};
