use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 시작 시 DB 연결 재시도 횟수
pub const CONNECT_ATTEMPTS: u32 = 10;
/// 재시도 간격
pub const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성. 고정 간격으로 재시도하고 모두 실패하면 마지막 에러 반환.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let mut attempt = 1;
        loop {
            match PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await
            {
                Ok(pool) => {
                    info!("{:<12} --> DB 연결 성공 (시도: {})", "Database", attempt);
                    return Ok(Self::from_pool(pool));
                }
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn!(
                        "{:<12} --> DB 연결 실패, 재시도 대기 중... (시도: {}/{}): {}",
                        "Database", attempt, CONNECT_ATTEMPTS, e
                    );
                    attempt += 1;
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// 스키마 마이그레이션 실행
    pub async fn initialize_database(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&*self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
