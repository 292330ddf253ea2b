//! 应用配置
//!
//! 所有配置项来自环境变量，未设置时使用默认值

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 上传大小默认上限：5 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 监听地址
    pub bind_addr: String,
    /// 数据目录（数据库与上传文件的根）
    pub data_dir: PathBuf,
    /// 数据库文件路径
    pub db_path: PathBuf,
    /// 上传文件目录
    pub uploads_dir: PathBuf,
    /// 上传大小上限（字节）
    pub max_upload_bytes: usize,
    /// 响应缓存 TTL（0 为关闭）
    pub cache_ttl: Duration,
    /// 响应缓存条目上限
    pub cache_max_entries: usize,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let data_dir = env::var("GALLERYWALL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let uploads_dir = env::var("GALLERYWALL_UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("uploads"));

        Self {
            bind_addr: env_string("GALLERYWALL_BIND", "127.0.0.1:3000"),
            db_path: data_dir.join("gallerywall.db"),
            data_dir,
            uploads_dir,
            max_upload_bytes: env_usize(
                "GALLERYWALL_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
            cache_ttl: Duration::from_secs(env_u64("GALLERYWALL_CACHE_TTL_SECS", 60)),
            cache_max_entries: env_usize("GALLERYWALL_CACHE_MAX_ENTRIES", 128),
        }
    }
}

/// 获取默认数据目录
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("GalleryWall")
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_u64_parses_and_falls_back() {
        env::set_var("GW_TEST_ENV_U64", "42");
        assert_eq!(env_u64("GW_TEST_ENV_U64", 7), 42);
        env::set_var("GW_TEST_ENV_U64", "not a number");
        assert_eq!(env_u64("GW_TEST_ENV_U64", 7), 7);
        env::remove_var("GW_TEST_ENV_U64");
        assert_eq!(env_u64("GW_TEST_ENV_U64", 7), 7);
    }

    #[test]
    fn test_env_string_default() {
        assert_eq!(env_string("GW_TEST_MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_default_data_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with("GalleryWall"));
    }
}
