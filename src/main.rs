// region:    --- Imports
use fish_auction_service::cache::{Cache, MemoryCache, RedisCache};
use fish_auction_service::config::Config;
use fish_auction_service::database::DatabaseManager;
use fish_auction_service::handlers::AppState;
use fish_auction_service::router;
use fish_auction_service::scheduler::AuctionScheduler;
use fish_auction_service::store::PgStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // DatabaseManager 생성 (재시도 후에도 실패하면 종료)
    let db_manager = match DatabaseManager::connect(&config).await {
        Ok(db_manager) => Arc::new(db_manager),
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            std::process::exit(1);
        }
    };

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 캐시 연결 (없으면 프로세스 내 캐시)
    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                info!("{:<12} --> Redis 캐시 연결 성공", "Main");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(
                    "{:<12} --> Redis 연결 실패, 프로세스 내 캐시 사용: {}",
                    "Main", e
                );
                Arc::new(MemoryCache::new())
            }
        },
        None => Arc::new(MemoryCache::new()),
    };

    let store = Arc::new(PgStore::new(Arc::clone(&db_manager)));

    // 경매 상태 보정 스케줄러
    let scheduler = AuctionScheduler::new(Arc::clone(&store), config.reconcile_interval);
    scheduler.start();

    let routes_all = router::routes(AppState::new(store, cache, config.cache_ttl));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
