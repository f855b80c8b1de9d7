/// 엔티티 조회용 읽기 캐시
/// 캐시는 보조 수단일 뿐이다. 미스는 Ok(None), 인프라 오류는 호출자가 로그만 남기고 무시한다.
// region:    --- Imports
use async_trait::async_trait;
use fred::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

// endregion: --- Imports

// region:    --- Cache Error
#[derive(Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] fred::error::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
// endregion: --- Cache Error

// region:    --- Keys
pub fn item_key(id: i64) -> String {
    format!("fish-auction:item:{}", id)
}

pub fn buyer_key(id: i64) -> String {
    format!("fish-auction:buyer:{}", id)
}

pub fn fisherman_key(id: i64) -> String {
    format!("fish-auction:fisherman:{}", id)
}
// endregion: --- Keys

// region:    --- Cache Trait
#[async_trait]
pub trait Cache: Send + Sync + 'static {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// JSON 역직렬화 조회
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn Cache,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match cache.get_raw(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// 캐시 저장. 실패해도 에러를 돌려주지 않는다.
pub async fn set_json_best_effort<T: Serialize + Sync>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    let result = match serde_json::to_string(value) {
        Ok(raw) => cache.set_raw(key, raw, ttl).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        warn!("{:<12} --> 캐시 저장 실패 key={}: {}", "Cache", key, e);
    }
}

/// 캐시 무효화. 실패해도 에러를 돌려주지 않는다.
pub async fn invalidate_best_effort(cache: &dyn Cache, key: &str) {
    if let Err(e) = cache.delete(key).await {
        warn!("{:<12} --> 캐시 삭제 실패 key={}: {}", "Cache", key, e);
    }
}
// endregion: --- Cache Trait

// region:    --- Redis Cache
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Redis 연결
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let config = Config::from_url(url)?;
        let pool = Pool::new(config, None, None, None, 6)?;

        pool.connect();
        pool.wait_for_connect().await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.pool.get::<Option<String>, _>(key).await?)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let secs = ttl.as_secs().max(1) as i64;
        self.pool
            .set::<(), _, _>(key, value, Some(Expiration::EX(secs)), None, false)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.pool.del::<i64, _>(key).await?;
        Ok(())
    }
}
// endregion: --- Redis Cache

// region:    --- Memory Cache
/// REDIS_URL이 없을 때 쓰는 프로세스 내 캐시
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
// endregion: --- Memory Cache
