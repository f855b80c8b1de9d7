/// 경매 상태 자동 완료 판정 및 보정
/// 예정된 시간이 지난 경매를 Completed로 옮긴다. 조회 직전이나 스케줄러에서 호출한다.
// region:    --- Imports
use super::model::{Auction, AuctionStatus};
use crate::clock;
use crate::error::Error;
use crate::store::AuctionRepository;
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Auto Complete
/// 자동 완료 대상인지 판정
/// 1. 종료 상태면 false
/// 2. 경매일이 영업일 기준 오늘보다 이전이면 true
/// 3. 오늘이고 종료 시각이 있으면, 그 시각이 지났을 때 true
pub fn should_auto_complete(auction: &Auction, now: DateTime<Utc>) -> bool {
    if auction.status.is_terminal() {
        return false;
    }

    let today = clock::business_day(now);
    let auction_day = auction.auction_date;

    if auction_day < today {
        return true;
    }

    match auction.end_time {
        Some(end_time) if auction_day == today => now > clock::business_instant(auction_day, end_time),
        _ => false,
    }
}

/// 필요하면 경매를 Completed로 옮기고 최신 상태를 돌려준다.
/// 여러 호출자가 동시에 실행해도 최종 상태는 Completed 하나로 수렴한다.
pub async fn reconcile(
    store: &impl AuctionRepository,
    auction: Auction,
    now: DateTime<Utc>,
) -> Result<Auction, Error> {
    if !should_auto_complete(&auction, now) {
        return Ok(auction);
    }

    info!(
        "{:<12} --> 종료 시간이 지난 경매 완료 처리 id: {}",
        "Reconcile", auction.id
    );
    store
        .complete_auction(auction.id, now)
        .await?
        .ok_or_else(|| Error::NotFound(format!("경매 {}", auction.id)))
}

/// 진행 중/예정 경매를 모두 점검해 완료 처리한 수를 돌려준다
pub async fn reconcile_all(
    store: &impl AuctionRepository,
    now: DateTime<Utc>,
) -> Result<usize, Error> {
    let mut completed = 0;
    for auction in store.list_open_auctions().await? {
        if should_auto_complete(&auction, now) {
            store.complete_auction(auction.id, now).await?;
            completed += 1;
        }
    }
    Ok(completed)
}
// endregion: --- Auto Complete

// region:    --- Transitions
/// 관리자 상태 변경 검증. 종료 상태에서는 어떤 전이도 받지 않는다.
pub fn check_transition(from: AuctionStatus, to: AuctionStatus) -> Result<(), Error> {
    if from.is_terminal() {
        return Err(Error::Conflict(format!(
            "{} 상태의 경매는 {}(으)로 변경할 수 없습니다.",
            from, to
        )));
    }
    Ok(())
}
// endregion: --- Transitions
