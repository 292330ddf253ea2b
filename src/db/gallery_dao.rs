//! 画廊数据访问层
//!
//! 维护画廊记录与成员镜像（gallery_images + image_count）的一致性

use rusqlite::{params, Connection, Row};

use crate::models::{
    gallery::{CreateGallery, UpdateGallery},
    now_iso8601, slugify, Gallery, GalleryImageSummary, GalleryWithImages,
};
use crate::utils::error::{AppError, AppResult};

use super::connection::Database;

/// 从数据库行映射到 Gallery 结构
fn row_to_gallery(row: &Row<'_>) -> rusqlite::Result<Gallery> {
    Ok(Gallery {
        gallery_id: row.get("gallery_id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        image_count: row.get("image_count")?,
        cover_image_id: row.get("cover_image_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// 画廊是否存在
pub(crate) fn gallery_exists(conn: &Connection, gallery_id: i64) -> AppResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM galleries WHERE gallery_id = ?1",
        params![gallery_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// 将图片追加到画廊成员列表并同步计数
///
/// 仅维护画廊侧镜像；images.gallery_id 由调用方在同一事务内设置。
pub(crate) fn attach_image(
    conn: &Connection,
    gallery_id: i64,
    image_id: i64,
    now: &str,
) -> AppResult<()> {
    let max_order: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(sort_order), 0) FROM gallery_images WHERE gallery_id = ?1",
            params![gallery_id],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let rows = conn.execute(
        "INSERT OR IGNORE INTO gallery_images (gallery_id, image_id, sort_order, date_added) VALUES (?1, ?2, ?3, ?4)",
        params![gallery_id, image_id, max_order + 1, now],
    )?;

    if rows > 0 {
        conn.execute(
            "UPDATE galleries SET image_count = image_count + 1, updated_at = ?1 WHERE gallery_id = ?2",
            params![now, gallery_id],
        )?;
    }

    Ok(())
}

/// 将图片从画廊成员列表移除并同步计数
pub(crate) fn detach_image(
    conn: &Connection,
    gallery_id: i64,
    image_id: i64,
    now: &str,
) -> AppResult<()> {
    let rows = conn.execute(
        "DELETE FROM gallery_images WHERE gallery_id = ?1 AND image_id = ?2",
        params![gallery_id, image_id],
    )?;

    if rows > 0 {
        conn.execute(
            "UPDATE galleries SET image_count = image_count - 1, updated_at = ?1 WHERE gallery_id = ?2",
            params![now, gallery_id],
        )?;
    }

    Ok(())
}

/// 加载画廊成员图片摘要（按画廊内排序）
fn load_gallery_images(conn: &Connection, gallery_id: i64) -> AppResult<Vec<GalleryImageSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT i.image_id, i.original_name, i.file_path, i.thumbnail_path, i.file_size, i.description
        FROM gallery_images gi
        INNER JOIN images i ON i.image_id = gi.image_id
        WHERE gi.gallery_id = ?1
        ORDER BY gi.sort_order
        "#,
    )?;

    let images: Vec<GalleryImageSummary> = stmt
        .query_map(params![gallery_id], |row| {
            Ok(GalleryImageSummary {
                image_id: row.get("image_id")?,
                original_name: row.get("original_name")?,
                file_path: row.get("file_path")?,
                thumbnail_path: row.get("thumbnail_path")?,
                file_size: row.get("file_size")?,
                description: row.get("description")?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(images)
}

impl Database {
    /// 创建画廊（slug 由名称派生，冲突返回 Conflict）
    pub fn create_gallery(&self, gallery: &CreateGallery) -> AppResult<Gallery> {
        if gallery.name.trim().is_empty() {
            return Err(AppError::InvalidInput("画廊名称不能为空".to_string()));
        }

        let conn = self.connection()?;
        let now = now_iso8601();
        let slug = slugify(&gallery.name);

        conn.execute(
            "INSERT INTO galleries (name, slug, description, image_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![gallery.name, slug, gallery.description, now],
        )
        .map_err(|e| AppError::from_constraint(e, &format!("画廊 slug 已存在: {}", slug)))?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT * FROM galleries WHERE gallery_id = ?1",
            params![id],
            row_to_gallery,
        )
        .map_err(AppError::Database)
    }

    /// 根据 ID 获取画廊
    pub fn get_gallery(&self, gallery_id: i64) -> AppResult<Option<Gallery>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM galleries WHERE gallery_id = ?1",
            params![gallery_id],
            row_to_gallery,
        );

        match result {
            Ok(gallery) => Ok(Some(gallery)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 根据 ID 获取画廊（带成员图片）
    pub fn get_gallery_with_images(&self, gallery_id: i64) -> AppResult<Option<GalleryWithImages>> {
        let conn = self.connection()?;

        let gallery = match conn.query_row(
            "SELECT * FROM galleries WHERE gallery_id = ?1",
            params![gallery_id],
            row_to_gallery,
        ) {
            Ok(g) => g,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        let images = load_gallery_images(&conn, gallery_id)?;
        Ok(Some(GalleryWithImages { gallery, images }))
    }

    /// 获取所有画廊（带成员图片，按创建时间倒序）
    pub fn get_all_galleries_with_images(&self) -> AppResult<Vec<GalleryWithImages>> {
        let conn = self.connection()?;

        let mut stmt =
            conn.prepare("SELECT * FROM galleries ORDER BY created_at DESC, gallery_id DESC")?;
        let galleries: Vec<Gallery> = stmt
            .query_map([], row_to_gallery)?
            .filter_map(|r| r.ok())
            .collect();

        let mut result = Vec::with_capacity(galleries.len());
        for gallery in galleries {
            let images = load_gallery_images(&conn, gallery.gallery_id)?;
            result.push(GalleryWithImages { gallery, images });
        }

        Ok(result)
    }

    /// 更新画廊（改名时重新派生 slug）
    pub fn update_gallery(&self, gallery_id: i64, update: &UpdateGallery) -> AppResult<bool> {
        let conn = self.connection()?;
        let now = now_iso8601();

        let mut updates = vec!["updated_at = ?"];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now)];

        let slug = update
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(slugify);
        if let Some(ref name) = update.name {
            if !name.trim().is_empty() {
                updates.push("name = ?");
                params_vec.push(Box::new(name.clone()));
                updates.push("slug = ?");
                params_vec.push(Box::new(slug.clone().unwrap()));
            }
        }
        if let Some(ref description) = update.description {
            updates.push("description = ?");
            params_vec.push(Box::new(description.clone()));
        }

        params_vec.push(Box::new(gallery_id));

        let sql = format!(
            "UPDATE galleries SET {} WHERE gallery_id = ?",
            updates.join(", ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_refs.as_slice()).map_err(|e| {
            AppError::from_constraint(
                e,
                &format!("画廊 slug 已存在: {}", slug.as_deref().unwrap_or("")),
            )
        })?;

        Ok(rows > 0)
    }

    /// 删除画廊：先清空所有成员图片的归属，再移除画廊记录
    ///
    /// 图片记录与文件不受影响。返回 false 表示画廊不存在。
    pub fn delete_gallery(&self, gallery_id: i64) -> AppResult<bool> {
        self.transaction(|conn| {
            let now = now_iso8601();

            // 图片侧：清空归属。此步失败则整个事务回滚，画廊不会被移除
            conn.execute(
                "UPDATE images SET gallery_id = NULL, updated_at = ?1 WHERE gallery_id = ?2",
                params![now, gallery_id],
            )?;

            // 画廊侧：清空成员镜像
            conn.execute(
                "DELETE FROM gallery_images WHERE gallery_id = ?1",
                params![gallery_id],
            )?;

            let rows = conn.execute(
                "DELETE FROM galleries WHERE gallery_id = ?1",
                params![gallery_id],
            )?;

            Ok(rows > 0)
        })
    }

    /// 获取画廊中的所有图片 ID（按画廊内排序）
    pub fn get_image_ids_in_gallery(&self, gallery_id: i64) -> AppResult<Vec<i64>> {
        let conn = self.connection()?;

        let mut stmt = conn
            .prepare("SELECT image_id FROM gallery_images WHERE gallery_id = ?1 ORDER BY sort_order")?;

        let ids: Vec<i64> = stmt
            .query_map(params![gallery_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateImage;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn test_image(name: &str, gallery_id: Option<i64>) -> CreateImage {
        CreateImage {
            file_name: format!("{}.jpg", name),
            original_name: format!("{}.jpg", name),
            file_path: format!("uploads/{}.jpg", name),
            thumbnail_path: format!("uploads/thumbnails/thumb-{}.jpg", name),
            file_size: 1024,
            mime_type: "image/jpeg".to_string(),
            description: String::new(),
            tags: Vec::new(),
            gallery_id,
            width: Some(100),
            height: Some(100),
            format: Some("jpeg".to_string()),
        }
    }

    #[test]
    fn test_create_and_get_gallery() {
        let db = test_db();

        let gallery = db
            .create_gallery(&CreateGallery {
                name: "旅行相册 2024".to_string(),
                description: Some("2024年夏季旅行".to_string()),
            })
            .unwrap();

        assert!(gallery.gallery_id > 0);
        assert_eq!(gallery.image_count, 0);
        assert_eq!(gallery.slug, "-2024");

        let retrieved = db.get_gallery(gallery.gallery_id).unwrap().unwrap();
        assert_eq!(retrieved.name, "旅行相册 2024");
    }

    #[test]
    fn test_create_gallery_empty_name() {
        let db = test_db();
        let err = db
            .create_gallery(&CreateGallery {
                name: "  ".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_slug_conflict() {
        let db = test_db();

        db.create_gallery(&CreateGallery {
            name: "Trips".to_string(),
            description: None,
        })
        .unwrap();

        // 不同写法、相同 slug
        let err = db
            .create_gallery(&CreateGallery {
                name: "TRIPS".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_rename_recomputes_slug() {
        let db = test_db();

        let gallery = db
            .create_gallery(&CreateGallery {
                name: "Old Name".to_string(),
                description: None,
            })
            .unwrap();
        assert_eq!(gallery.slug, "old-name");

        let updated = db
            .update_gallery(
                gallery.gallery_id,
                &UpdateGallery {
                    name: Some("New Name 2024".to_string()),
                    description: None,
                },
            )
            .unwrap();
        assert!(updated);

        let after = db.get_gallery(gallery.gallery_id).unwrap().unwrap();
        assert_eq!(after.slug, "new-name-2024");
        assert!(after.updated_at >= gallery.updated_at);
    }

    #[test]
    fn test_rename_slug_conflict() {
        let db = test_db();

        db.create_gallery(&CreateGallery {
            name: "First".to_string(),
            description: None,
        })
        .unwrap();
        let second = db
            .create_gallery(&CreateGallery {
                name: "Second".to_string(),
                description: None,
            })
            .unwrap();

        let err = db
            .update_gallery(
                second.gallery_id,
                &UpdateGallery {
                    name: Some("first".to_string()),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_delete_gallery_detaches_images() {
        let db = test_db();

        let gallery = db
            .create_gallery(&CreateGallery {
                name: "待删除".to_string(),
                description: None,
            })
            .unwrap();

        let image = db
            .create_image(&test_image("a", Some(gallery.gallery_id)))
            .unwrap();
        assert_eq!(image.gallery_id, Some(gallery.gallery_id));

        let deleted = db.delete_gallery(gallery.gallery_id).unwrap();
        assert!(deleted);

        // 画廊不再可取
        assert!(db.get_gallery(gallery.gallery_id).unwrap().is_none());

        // 图片仍在，归属已清空
        let after = db.get_image(image.image_id).unwrap().unwrap();
        assert_eq!(after.gallery_id, None);
    }

    #[test]
    fn test_delete_missing_gallery() {
        let db = test_db();
        assert!(!db.delete_gallery(999).unwrap());
    }

    #[test]
    fn test_galleries_listed_newest_first() {
        let db = test_db();

        let first = db
            .create_gallery(&CreateGallery {
                name: "相册A".to_string(),
                description: None,
            })
            .unwrap();
        let second = db
            .create_gallery(&CreateGallery {
                name: "相册B".to_string(),
                description: None,
            })
            .unwrap();

        let all = db.get_all_galleries_with_images().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].gallery.gallery_id, second.gallery_id);
        assert_eq!(all[1].gallery.gallery_id, first.gallery_id);
    }
}
