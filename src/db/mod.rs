//! GalleryWall 数据库模块
//!
//! 包含数据库连接管理和数据访问层

pub mod schema;
pub mod connection;
pub mod image_dao;
pub mod gallery_dao;

// 重新导出常用类型
pub use connection::{Database, DatabaseStats};
