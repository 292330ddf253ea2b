//! 图片数据访问层
//!
//! 图片归属以 images.gallery_id 为准；所有修改归属的操作
//! 在同一事务内同步画廊侧镜像（gallery_images + image_count）。

use rusqlite::{params, Connection, Row};

use crate::models::{
    image::{CreateImage, UpdateImage},
    now_iso8601, GalleryRef, Image, ImageWithGallery,
};
use crate::utils::error::{AppError, AppResult};

use super::connection::Database;
use super::gallery_dao::{attach_image, detach_image, gallery_exists};

/// 从数据库行映射到 Image 结构
fn row_to_image(row: &Row<'_>) -> rusqlite::Result<Image> {
    let tags_json: String = row.get("tags")?;
    Ok(Image {
        image_id: row.get("image_id")?,
        file_name: row.get("file_name")?,
        original_name: row.get("original_name")?,
        file_path: row.get("file_path")?,
        thumbnail_path: row.get("thumbnail_path")?,
        file_size: row.get("file_size")?,
        mime_type: row.get("mime_type")?,
        description: row.get("description")?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        gallery_id: row.get("gallery_id")?,
        width: row.get("width")?,
        height: row.get("height")?,
        format: row.get("format")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// 在事务内按 ID 读取图片
fn query_image(conn: &Connection, image_id: i64) -> AppResult<Option<Image>> {
    let result = conn.query_row(
        "SELECT * FROM images WHERE image_id = ?1",
        params![image_id],
        row_to_image,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// 图片行 + LEFT JOIN 的画廊名
fn row_to_image_with_gallery(row: &Row<'_>) -> rusqlite::Result<ImageWithGallery> {
    let image = row_to_image(row)?;
    let gallery_name: Option<String> = row.get("gallery_name")?;
    let gallery = match (image.gallery_id, gallery_name) {
        (Some(gallery_id), Some(name)) => Some(GalleryRef { gallery_id, name }),
        _ => None,
    };
    Ok(ImageWithGallery { image, gallery })
}

impl Database {
    /// 插入图片记录；指定画廊时在同一事务内同步画廊侧
    ///
    /// 画廊不存在时整个事务回滚（不会留下无效归属）。
    pub fn create_image(&self, create: &CreateImage) -> AppResult<Image> {
        self.transaction(|conn| {
            let now = now_iso8601();

            if let Some(gallery_id) = create.gallery_id {
                if !gallery_exists(conn, gallery_id)? {
                    return Err(AppError::NotFound(format!("画廊 {}", gallery_id)));
                }
            }

            let tags_json = serde_json::to_string(&create.tags)
                .map_err(|e| AppError::General(format!("标签序列化失败: {}", e)))?;

            conn.execute(
                r#"
                INSERT INTO images (
                    file_name, original_name, file_path, thumbnail_path, file_size,
                    mime_type, description, tags, gallery_id, width, height, format,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
                "#,
                params![
                    create.file_name,
                    create.original_name,
                    create.file_path,
                    create.thumbnail_path,
                    create.file_size,
                    create.mime_type,
                    create.description,
                    tags_json,
                    create.gallery_id,
                    create.width,
                    create.height,
                    create.format,
                    now,
                ],
            )?;

            let image_id = conn.last_insert_rowid();

            // 画廊侧镜像仅在图片插入成功后更新
            if let Some(gallery_id) = create.gallery_id {
                attach_image(conn, gallery_id, image_id, &now)?;
            }

            query_image(conn, image_id)?
                .ok_or_else(|| AppError::General("插入后未能读回图片".to_string()))
        })
    }

    /// 根据 ID 获取图片
    pub fn get_image(&self, image_id: i64) -> AppResult<Option<Image>> {
        let conn = self.connection()?;
        query_image(&conn, image_id)
    }

    /// 根据 ID 获取图片（带画廊名称）
    pub fn get_image_with_gallery(&self, image_id: i64) -> AppResult<Option<ImageWithGallery>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            r#"
            SELECT i.*, g.name AS gallery_name
            FROM images i
            LEFT JOIN galleries g ON g.gallery_id = i.gallery_id
            WHERE i.image_id = ?1
            "#,
            params![image_id],
            row_to_image_with_gallery,
        );

        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 获取图片列表（可按画廊过滤，按创建时间倒序）
    pub fn get_images(&self, gallery_id: Option<i64>) -> AppResult<Vec<ImageWithGallery>> {
        let conn = self.connection()?;

        let base = r#"
            SELECT i.*, g.name AS gallery_name
            FROM images i
            LEFT JOIN galleries g ON g.gallery_id = i.gallery_id
        "#;

        let images: Vec<ImageWithGallery> = match gallery_id {
            Some(id) => {
                let sql = format!(
                    "{} WHERE i.gallery_id = ?1 ORDER BY i.created_at DESC, i.image_id DESC",
                    base
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows: Vec<ImageWithGallery> = stmt
                    .query_map(params![id], row_to_image_with_gallery)?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
            None => {
                let sql = format!("{} ORDER BY i.created_at DESC, i.image_id DESC", base);
                let mut stmt = conn.prepare(&sql)?;
                let rows: Vec<ImageWithGallery> = stmt
                    .query_map([], row_to_image_with_gallery)?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
        };

        Ok(images)
    }

    /// 更新图片：归属变更与字段合并作为一个事务执行
    ///
    /// 归属变更顺序：先从旧画廊移出，再加入新画廊，最后写图片本身。
    /// 请求的目标画廊与当前一致时跳过所有画廊侧写入。
    pub fn update_image(&self, image_id: i64, update: &UpdateImage) -> AppResult<Image> {
        self.transaction(|conn| {
            let now = now_iso8601();

            let image = query_image(conn, image_id)?
                .ok_or_else(|| AppError::NotFound(format!("图片 {}", image_id)))?;

            let mut gallery_id = image.gallery_id;
            if let Some(requested) = update.gallery_id {
                if requested != image.gallery_id {
                    if let Some(old_id) = image.gallery_id {
                        detach_image(conn, old_id, image_id, &now)?;
                    }
                    if let Some(new_id) = requested {
                        if !gallery_exists(conn, new_id)? {
                            return Err(AppError::NotFound(format!("画廊 {}", new_id)));
                        }
                        attach_image(conn, new_id, image_id, &now)?;
                    }
                    gallery_id = requested;
                }
            }

            // 可变字段白名单：name → original_name、description、tags
            let mut updates = vec!["gallery_id = ?", "updated_at = ?"];
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
                vec![Box::new(gallery_id), Box::new(now.clone())];

            if let Some(ref name) = update.name {
                if !name.trim().is_empty() {
                    updates.push("original_name = ?");
                    params_vec.push(Box::new(name.clone()));
                }
            }
            if let Some(ref description) = update.description {
                updates.push("description = ?");
                params_vec.push(Box::new(description.clone()));
            }
            if let Some(ref tags) = update.tags {
                let tags_json = serde_json::to_string(tags)
                    .map_err(|e| AppError::General(format!("标签序列化失败: {}", e)))?;
                updates.push("tags = ?");
                params_vec.push(Box::new(tags_json));
            }

            params_vec.push(Box::new(image_id));

            let sql = format!("UPDATE images SET {} WHERE image_id = ?", updates.join(", "));
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;

            query_image(conn, image_id)?
                .ok_or_else(|| AppError::General("更新后未能读回图片".to_string()))
        })
    }

    /// 删除图片记录：先从所属画廊移出，再移除记录
    ///
    /// 返回被删除的记录（调用方据此清理磁盘文件）。
    pub fn delete_image(&self, image_id: i64) -> AppResult<Image> {
        self.transaction(|conn| {
            let now = now_iso8601();

            let image = query_image(conn, image_id)?
                .ok_or_else(|| AppError::NotFound(format!("图片 {}", image_id)))?;

            if let Some(gallery_id) = image.gallery_id {
                detach_image(conn, gallery_id, image_id, &now)?;
            }

            conn.execute(
                "DELETE FROM images WHERE image_id = ?1",
                params![image_id],
            )?;

            Ok(image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateGallery;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn test_gallery(db: &Database, name: &str) -> i64 {
        db.create_gallery(&CreateGallery {
            name: name.to_string(),
            description: None,
        })
        .unwrap()
        .gallery_id
    }

    fn test_image(name: &str, gallery_id: Option<i64>) -> CreateImage {
        CreateImage {
            file_name: format!("{}.jpg", name),
            original_name: format!("{}.jpg", name),
            file_path: format!("uploads/{}.jpg", name),
            thumbnail_path: format!("uploads/thumbnails/thumb-{}.jpg", name),
            file_size: 2048,
            mime_type: "image/jpeg".to_string(),
            description: String::new(),
            tags: vec!["测试".to_string()],
            gallery_id,
            width: Some(320),
            height: Some(240),
            format: Some("jpeg".to_string()),
        }
    }

    /// 校验计数一致性与引用一致性
    fn assert_gallery_consistent(db: &Database, gallery_id: i64) {
        let gallery = db.get_gallery(gallery_id).unwrap().unwrap();
        let member_ids = db.get_image_ids_in_gallery(gallery_id).unwrap();
        assert_eq!(gallery.image_count as usize, member_ids.len());

        for image_id in &member_ids {
            let image = db.get_image(*image_id).unwrap().unwrap();
            assert_eq!(image.gallery_id, Some(gallery_id));
            assert_eq!(member_ids.iter().filter(|id| *id == image_id).count(), 1);
        }
    }

    #[test]
    fn test_create_image_unassigned() {
        let db = test_db();
        let image = db.create_image(&test_image("solo", None)).unwrap();
        assert!(image.image_id > 0);
        assert_eq!(image.gallery_id, None);
        assert_eq!(image.tags, vec!["测试".to_string()]);
    }

    #[test]
    fn test_create_image_into_gallery() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Trips");

        let image = db
            .create_image(&test_image("a", Some(gallery_id)))
            .unwrap();

        let gallery = db.get_gallery(gallery_id).unwrap().unwrap();
        assert_eq!(gallery.image_count, 1);
        assert_eq!(
            db.get_image_ids_in_gallery(gallery_id).unwrap(),
            vec![image.image_id]
        );
        assert_gallery_consistent(&db, gallery_id);
    }

    #[test]
    fn test_create_image_into_missing_gallery_rolls_back() {
        let db = test_db();

        let err = db.create_image(&test_image("a", Some(999))).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // 事务回滚：没有留下图片记录
        assert!(db.get_images(None).unwrap().is_empty());
    }

    #[test]
    fn test_reassign_between_galleries() {
        let db = test_db();
        let gallery_a = test_gallery(&db, "Gallery A");
        let gallery_b = test_gallery(&db, "Gallery B");

        let first = db
            .create_image(&test_image("one", Some(gallery_a)))
            .unwrap();
        let second = db
            .create_image(&test_image("two", Some(gallery_a)))
            .unwrap();

        db.update_image(
            second.image_id,
            &UpdateImage {
                gallery_id: Some(Some(gallery_b)),
                ..Default::default()
            },
        )
        .unwrap();

        let a = db.get_gallery(gallery_a).unwrap().unwrap();
        let b = db.get_gallery(gallery_b).unwrap().unwrap();
        assert_eq!(a.image_count, 1);
        assert_eq!(b.image_count, 1);
        assert_eq!(
            db.get_image_ids_in_gallery(gallery_a).unwrap(),
            vec![first.image_id]
        );
        assert_eq!(
            db.get_image_ids_in_gallery(gallery_b).unwrap(),
            vec![second.image_id]
        );

        let moved = db.get_image(second.image_id).unwrap().unwrap();
        assert_eq!(moved.gallery_id, Some(gallery_b));

        assert_gallery_consistent(&db, gallery_a);
        assert_gallery_consistent(&db, gallery_b);
    }

    #[test]
    fn test_reassign_same_gallery_is_noop() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Stable");

        let image = db
            .create_image(&test_image("same", Some(gallery_id)))
            .unwrap();
        let before = db.get_gallery(gallery_id).unwrap().unwrap();

        db.update_image(
            image.image_id,
            &UpdateImage {
                gallery_id: Some(Some(gallery_id)),
                ..Default::default()
            },
        )
        .unwrap();

        let after = db.get_gallery(gallery_id).unwrap().unwrap();
        assert_eq!(after.image_count, 1);
        // 画廊侧完全未被触碰
        assert_eq!(after.updated_at, before.updated_at);
        assert_gallery_consistent(&db, gallery_id);
    }

    #[test]
    fn test_unassign_with_null() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Emptying");

        let image = db
            .create_image(&test_image("out", Some(gallery_id)))
            .unwrap();

        db.update_image(
            image.image_id,
            &UpdateImage {
                gallery_id: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

        let gallery = db.get_gallery(gallery_id).unwrap().unwrap();
        assert_eq!(gallery.image_count, 0);
        assert!(db.get_image_ids_in_gallery(gallery_id).unwrap().is_empty());
        assert_eq!(
            db.get_image(image.image_id).unwrap().unwrap().gallery_id,
            None
        );
    }

    #[test]
    fn test_update_fields_without_gallery_change() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Fields");

        let image = db
            .create_image(&test_image("edit", Some(gallery_id)))
            .unwrap();

        let updated = db
            .update_image(
                image.image_id,
                &UpdateImage {
                    name: Some("新名字.jpg".to_string()),
                    description: Some("改过的描述".to_string()),
                    tags: Some(vec!["a".to_string(), "b".to_string()]),
                    gallery_id: None,
                },
            )
            .unwrap();

        assert_eq!(updated.original_name, "新名字.jpg");
        assert_eq!(updated.description, "改过的描述");
        assert_eq!(updated.tags, vec!["a".to_string(), "b".to_string()]);
        // 归属保持不变
        assert_eq!(updated.gallery_id, Some(gallery_id));
        assert_gallery_consistent(&db, gallery_id);
    }

    #[test]
    fn test_update_missing_image() {
        let db = test_db();
        let err = db
            .update_image(42, &UpdateImage::default())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_reassign_to_missing_gallery_rolls_back() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Origin");

        let image = db
            .create_image(&test_image("stay", Some(gallery_id)))
            .unwrap();

        let err = db
            .update_image(
                image.image_id,
                &UpdateImage {
                    gallery_id: Some(Some(404)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // 回滚：旧画廊的成员关系原封不动
        let gallery = db.get_gallery(gallery_id).unwrap().unwrap();
        assert_eq!(gallery.image_count, 1);
        assert_eq!(
            db.get_image(image.image_id).unwrap().unwrap().gallery_id,
            Some(gallery_id)
        );
        assert_gallery_consistent(&db, gallery_id);
    }

    #[test]
    fn test_delete_image_updates_gallery() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "Shrinking");

        let image = db
            .create_image(&test_image("gone", Some(gallery_id)))
            .unwrap();

        let deleted = db.delete_image(image.image_id).unwrap();
        assert_eq!(deleted.image_id, image.image_id);

        assert!(db.get_image(image.image_id).unwrap().is_none());
        let gallery = db.get_gallery(gallery_id).unwrap().unwrap();
        assert_eq!(gallery.image_count, 0);
        assert_gallery_consistent(&db, gallery_id);
    }

    #[test]
    fn test_list_filtered_by_gallery_newest_first() {
        let db = test_db();
        let gallery_id = test_gallery(&db, "List");

        let first = db
            .create_image(&test_image("old", Some(gallery_id)))
            .unwrap();
        let second = db
            .create_image(&test_image("new", Some(gallery_id)))
            .unwrap();
        db.create_image(&test_image("other", None)).unwrap();

        let listed = db.get_images(Some(gallery_id)).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].image.image_id, second.image_id);
        assert_eq!(listed[1].image.image_id, first.image_id);
        // 画廊名已解析
        assert_eq!(listed[0].gallery.as_ref().unwrap().name, "List");

        let all = db.get_images(None).unwrap();
        assert_eq!(all.len(), 3);
    }
}
