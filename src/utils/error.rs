//! GalleryWall 错误处理模块
//!
//! 定义应用程序错误类型

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 图像处理错误
    #[error("图像处理错误: {0}")]
    Image(#[from] image::ImageError),

    /// 请求参数无效
    #[error("请求无效: {0}")]
    InvalidInput(String),

    /// 记录未找到
    #[error("未找到: {0}")]
    NotFound(String),

    /// 唯一约束冲突
    #[error("冲突: {0}")]
    Conflict(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 通用错误
    #[error("{0}")]
    General(String),
}

impl AppError {
    /// 将 SQLite 唯一约束错误转换为 Conflict，其余保持数据库错误
    pub fn from_constraint(err: rusqlite::Error, what: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::Conflict(what.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;
