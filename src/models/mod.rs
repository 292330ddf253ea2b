//! GalleryWall 数据模型模块
//!
//! 包含所有数据结构定义

pub mod gallery;
pub mod image;

// 重新导出常用类型
pub use gallery::{
    slugify, CreateGallery, Gallery, GalleryImageSummary, GalleryWithImages, UpdateGallery,
};
pub use image::{
    now_iso8601, parse_tags, CreateImage, GalleryRef, Image, ImageWithGallery, UpdateImage,
};
