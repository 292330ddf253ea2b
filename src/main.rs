//! GalleryWall 服务入口

use std::sync::Arc;

use anyhow::Context;

use gallerywall::api::{build_router, AppState};
use gallerywall::config::AppConfig;
use gallerywall::db::Database;
use gallerywall::services::{LibraryService, MediaStore, ResponseCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("GalleryWall 启动中...");

    let config = AppConfig::from_env();
    tracing::info!("数据目录: {:?}", config.data_dir);

    // 初始化数据库
    let database = Database::open(config.db_path.clone()).context("无法打开数据库")?;
    database.init().context("无法初始化数据库")?;

    // 初始化媒体存储
    let store =
        MediaStore::new(config.uploads_dir.clone()).context("无法初始化上传目录")?;

    let db = Arc::new(database);
    let library = Arc::new(LibraryService::new(
        db.clone(),
        store.clone(),
        config.max_upload_bytes,
    ));
    let cache = Arc::new(ResponseCache::new(
        config.cache_ttl,
        config.cache_max_entries,
    ));

    let state = AppState {
        db,
        library,
        cache,
        store,
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    tracing::info!("服务监听于 {}", config.bind_addr);

    axum::serve(listener, app).await.context("服务异常退出")?;

    Ok(())
}
