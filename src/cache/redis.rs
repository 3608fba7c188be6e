//! Redis 缓存后端
//!
//! 共享一个 `ConnectionManager`（多路复用、断线自动重连），每次操作克隆句柄；
//! 批量写入走 pipeline，模式扫描走 `SCAN` 游标。

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;

use super::CacheBackend;
use crate::error::LocaleResult;

/// 每轮 `SCAN` 的建议数量
const SCAN_COUNT: usize = 500;

/// Redis 缓存后端
#[derive(Clone)]
pub struct RedisCacheBackend {
    manager: ConnectionManager,
}

impl RedisCacheBackend {
    /// 连接 Redis 并创建后端
    pub async fn connect(url: &str) -> LocaleResult<Self> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    /// 共享连接的句柄，克隆不会建立新连接
    async fn connection(&self) -> LocaleResult<ConnectionManager> {
        Ok(self.manager.clone())
    }

    /// 测试连接
    pub async fn ping(&self) -> LocaleResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Redis 的 EX 参数至少为 1 秒
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> LocaleResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> LocaleResult<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)], ttl: Duration) -> LocaleResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;
        let seconds = ttl_seconds(ttl);
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> LocaleResult<bool> {
        let mut conn = self.connection().await?;
        let deleted: usize = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> LocaleResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection().await?;
        let deleted: usize = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(deleted)
    }

    async fn scan_pattern(&self, pattern: &str) -> LocaleResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN 可能重复返回同一个键
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}
