//! 响应缓存服务
//!
//! 以请求 URL 为键的进程内 TTL 缓存，只作为读路径的优化层：
//! 任何失败都退化为缓存未命中，不影响请求本身。
//! 写操作一律整体失效（invalidate-on-write）。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 缓存条目
#[derive(Clone)]
struct CacheEntry {
    /// 序列化后的响应体
    body: String,
    created_at: Instant,
}

/// 进程内响应缓存
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 缓存是否启用（TTL 为零即关闭）
    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    /// 按键读取未过期的响应体
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled() {
            return None;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        entries.retain(|_, v| v.created_at.elapsed() <= self.ttl);
        entries.get(key).map(|e| e.body.clone())
    }

    /// 写入响应体；容量满时淘汰最旧条目
    pub fn insert(&self, key: String, body: String) {
        if !self.enabled() {
            return;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.retain(|_, v| v.created_at.elapsed() <= self.ttl);
        if entries.len() >= self.max_entries {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, v)| v.created_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&victim);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                body,
                created_at: Instant::now(),
            },
        );
    }

    /// 清空全部条目（写操作后调用）
    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            if !entries.is_empty() {
                tracing::debug!("响应缓存失效，清除 {} 条", entries.len());
                entries.clear();
            }
        }
    }
}
