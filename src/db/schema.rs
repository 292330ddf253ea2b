//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句和迁移脚本

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 1;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 画廊表
CREATE TABLE IF NOT EXISTS galleries (
    gallery_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    slug            TEXT NOT NULL UNIQUE,
    description     TEXT,
    image_count     INTEGER NOT NULL DEFAULT 0,
    cover_image_id  INTEGER REFERENCES images(image_id) ON DELETE SET NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- 图片表
CREATE TABLE IF NOT EXISTS images (
    image_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name       TEXT NOT NULL UNIQUE,
    original_name   TEXT NOT NULL,
    file_path       TEXT NOT NULL,
    thumbnail_path  TEXT NOT NULL,
    file_size       INTEGER NOT NULL,
    mime_type       TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    tags            TEXT NOT NULL DEFAULT '[]',
    gallery_id      INTEGER REFERENCES galleries(gallery_id),
    width           INTEGER,
    height          INTEGER,
    format          TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- 画廊-图片成员表（画廊侧冗余镜像，带画廊内排序）
CREATE TABLE IF NOT EXISTS gallery_images (
    gallery_id      INTEGER NOT NULL REFERENCES galleries(gallery_id) ON DELETE CASCADE,
    image_id        INTEGER NOT NULL REFERENCES images(image_id) ON DELETE CASCADE,
    sort_order      INTEGER DEFAULT 0,
    date_added      TEXT NOT NULL,
    PRIMARY KEY (gallery_id, image_id)
);

-- 数据库版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      TEXT NOT NULL
);

-- 索引
CREATE INDEX IF NOT EXISTS idx_images_gallery_id ON images(gallery_id);
CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at);

CREATE INDEX IF NOT EXISTS idx_galleries_created_at ON galleries(created_at);

CREATE INDEX IF NOT EXISTS idx_gallery_images_image_id ON gallery_images(image_id);
"#;

/// 迁移脚本
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// 所有迁移脚本列表
pub const MIGRATIONS: &[Migration] = &[];
