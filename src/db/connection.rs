//! 数据库连接管理
//!
//! 提供 SQLite 数据库连接和初始化功能

use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::utils::error::{AppError, AppResult};

use super::schema::{INIT_SCHEMA, MIGRATIONS, SCHEMA_VERSION};

/// 数据库连接管理器
#[derive(Clone)]
pub struct Database {
    /// 数据库连接（使用 Arc<Mutex> 实现线程安全）
    conn: Arc<Mutex<Connection>>,
    /// 数据库文件路径
    path: PathBuf,
}

impl Database {
    /// 打开或创建数据库
    pub fn open(path: PathBuf) -> AppResult<Self> {
        // 确保父目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };

        db.configure()?;

        Ok(db)
    }

    /// 打开内存数据库（用于测试）
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        };

        db.configure()?;

        Ok(db)
    }

    /// 配置数据库连接
    fn configure(&self) -> AppResult<()> {
        let conn = self.connection()?;

        // 启用 WAL 模式（提高并发性能）
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;

        Ok(())
    }

    /// 初始化数据库 Schema
    pub fn init(&self) -> AppResult<()> {
        let conn = self.connection()?;

        // 检查是否已初始化
        let table_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !table_exists {
            tracing::info!("初始化数据库 Schema...");

            conn.execute_batch(INIT_SCHEMA)?;

            let now = crate::models::now_iso8601();
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![SCHEMA_VERSION, now],
            )?;

            tracing::info!("数据库 Schema 初始化完成，版本: {}", SCHEMA_VERSION);
        } else {
            self.migrate_internal(&conn)?;
        }

        Ok(())
    }

    /// 执行数据库迁移
    fn migrate_internal(&self, conn: &Connection) -> AppResult<()> {
        let current_version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        tracing::info!("当前数据库版本: {}", current_version);

        for migration in MIGRATIONS {
            if migration.version > current_version {
                tracing::info!(
                    "执行迁移 v{}: {}",
                    migration.version,
                    migration.description
                );

                conn.execute_batch(migration.sql)?;

                let now = crate::models::now_iso8601();
                conn.execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, now],
                )?;

                tracing::info!("迁移 v{} 完成", migration.version);
            }
        }

        Ok(())
    }

    /// 获取数据库连接（用于执行查询）
    pub fn connection(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            AppError::Database(rusqlite::Error::InvalidParameterName(e.to_string()))
        })
    }

    /// 执行事务
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// 获取数据库文件路径
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// 获取数据库统计信息
    pub fn stats(&self) -> AppResult<DatabaseStats> {
        let conn = self.connection()?;

        let image_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
            .unwrap_or(0);

        let gallery_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM galleries", [], |row| row.get(0))
            .unwrap_or(0);

        Ok(DatabaseStats {
            image_count,
            gallery_count,
        })
    }
}

/// 数据库统计信息
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub image_count: i64,
    pub gallery_count: i64,
}
