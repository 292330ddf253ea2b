//! GalleryWall 服务模块
//!
//! 包含所有业务逻辑服务

pub mod cache;
pub mod library;
pub mod metadata;
pub mod storage;
pub mod thumbnail;

// 重新导出常用类型
pub use cache::ResponseCache;
pub use library::{LibraryService, UploadRequest, ALLOWED_MIME_TYPES};
pub use metadata::{ImageMetadata, MetadataExtractor};
pub use storage::MediaStore;
pub use thumbnail::{ThumbnailService, THUMBNAIL_SIZE};
