/// 경매 상태 보정 스케줄러
/// 조회 시점의 보정과 별개로, 주기적으로 종료 시간이 지난 경매를 Completed로 옮긴다.
/// 조회 경로와 동시에 실행돼도 결과는 같다.
// region:    --- Imports
use crate::auction::status::reconcile_all;
use crate::store::AuctionRepository;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Auction Scheduler
/// 경매 상태 보정 스케줄러
pub struct AuctionScheduler<S> {
    store: Arc<S>,
    period: Duration,
}

impl<S: AuctionRepository> AuctionScheduler<S> {
    pub fn new(store: Arc<S>, period: Duration) -> Self {
        Self { store, period }
    }

    /// 스케줄러 시작
    pub fn start(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                Self::sweep(store.as_ref()).await;
            }
        })
    }

    /// 1회 보정 실행
    async fn sweep(store: &S) {
        match reconcile_all(store, Utc::now()).await {
            Ok(0) => debug!("{:<12} --> 완료 처리할 경매 없음", "Scheduler"),
            Ok(count) => info!("{:<12} --> 경매 {}건 완료 처리", "Scheduler", count),
            Err(e) => error!(
                "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                "Scheduler", e
            ),
        }
    }
}
// endregion: --- Auction Scheduler
