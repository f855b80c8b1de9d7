/// 관리자 경매 커맨드 처리
/// 1. 경매장 생성/삭제
/// 2. 경매 생성/상태 변경/삭제
/// 3. 상품 등록/상태 변경
// region:    --- Imports
use super::model::{
    Auction, AuctionItem, AuctionStatus, ItemStatus, NewAuction, NewItem, NewVenue, Venue,
};
use super::status::check_transition;
use crate::cache::{self, Cache};
use crate::error::Error;
use crate::store::{AuctionRepository, ItemRepository, PartyRepository, VenueRepository};
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Venue Commands

/// 경매장 생성
pub async fn create_venue(store: &impl VenueRepository, cmd: NewVenue) -> Result<Venue, Error> {
    info!("{:<12} --> 경매장 생성: {}", "Command", cmd.name);
    if cmd.name.trim().is_empty() {
        return Err(Error::Validation("경매장 이름이 비어 있습니다.".to_string()));
    }
    store.create_venue(cmd).await
}

/// 경매장 삭제 (논리 삭제)
pub async fn delete_venue(
    store: &impl VenueRepository,
    venue_id: i64,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    info!("{:<12} --> 경매장 삭제 id: {}", "Command", venue_id);
    store.soft_delete_venue(venue_id, now).await
}

// endregion: --- Venue Commands

// region:    --- Auction Commands

/// 경매 생성
pub async fn create_auction<S>(store: &S, cmd: NewAuction, now: DateTime<Utc>) -> Result<Auction, Error>
where
    S: VenueRepository + AuctionRepository,
{
    info!(
        "{:<12} --> 경매 생성 venue: {}, date: {}",
        "Command", cmd.venue_id, cmd.auction_date
    );
    if let Some(status) = cmd.status {
        if status.is_terminal() {
            return Err(Error::Validation(format!(
                "{} 상태로 경매를 생성할 수 없습니다.",
                status
            )));
        }
    }
    if let (Some(start), Some(end)) = (cmd.start_time, cmd.end_time) {
        if end <= start {
            return Err(Error::Validation(
                "종료 시각은 시작 시각보다 늦어야 합니다.".to_string(),
            ));
        }
    }
    if store.find_venue(cmd.venue_id).await?.is_none() {
        return Err(Error::NotFound(format!("경매장 {}", cmd.venue_id)));
    }
    store.create_auction(cmd, now).await
}

/// 경매 상태 변경. 상태 문자열은 고정된 값만 받는다.
pub async fn update_auction_status(
    store: &impl AuctionRepository,
    auction_id: i64,
    status: &str,
    now: DateTime<Utc>,
) -> Result<Auction, Error> {
    info!(
        "{:<12} --> 경매 상태 변경 id: {}, status: {}",
        "Command", auction_id, status
    );
    let status: AuctionStatus = status.parse()?;
    let current = store
        .find_auction(auction_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("경매 {}", auction_id)))?;
    check_transition(current.status, status)?;

    // 확인 이후 다른 호출자가 종료 처리했을 수 있다. 쓰기 조건이 최종 판정.
    match store.update_auction_status(auction_id, status, now).await? {
        Some(auction) => Ok(auction),
        None => match store.find_auction(auction_id).await? {
            Some(latest) => Err(Error::Conflict(format!(
                "경매 {}은(는) 이미 {} 상태입니다.",
                auction_id, latest.status
            ))),
            None => Err(Error::NotFound(format!("경매 {}", auction_id))),
        },
    }
}

/// 경매 삭제. 상품에 입찰이 있으면 Conflict.
pub async fn delete_auction<S>(store: &S, cache: &dyn Cache, auction_id: i64) -> Result<(), Error>
where
    S: AuctionRepository + ItemRepository,
{
    info!("{:<12} --> 경매 삭제 id: {}", "Command", auction_id);
    let items = store.list_item_listings(auction_id).await?;
    store.delete_auction(auction_id).await?;

    for listing in items {
        cache::invalidate_best_effort(cache, &cache::item_key(listing.item.id)).await;
    }
    Ok(())
}

// endregion: --- Auction Commands

// region:    --- Item Commands

/// 상품 등록. 상태를 주지 않으면 Pending.
pub async fn create_item<S>(store: &S, cmd: NewItem, now: DateTime<Utc>) -> Result<AuctionItem, Error>
where
    S: AuctionRepository + ItemRepository + PartyRepository,
{
    info!(
        "{:<12} --> 상품 등록 auction: {}, fish: {}",
        "Command", cmd.auction_id, cmd.fish_type
    );
    if cmd.fish_type.trim().is_empty() || cmd.unit.trim().is_empty() {
        return Err(Error::Validation("어종과 단위는 필수입니다.".to_string()));
    }
    if cmd.quantity <= 0 {
        return Err(Error::Validation("수량은 0보다 커야 합니다.".to_string()));
    }
    if cmd.status == Some(ItemStatus::Sold) {
        return Err(Error::Validation(
            "낙찰 상태로 상품을 등록할 수 없습니다.".to_string(),
        ));
    }
    if store.find_auction(cmd.auction_id).await?.is_none() {
        return Err(Error::NotFound(format!("경매 {}", cmd.auction_id)));
    }
    if store.find_fisherman(cmd.fisherman_id).await?.is_none() {
        return Err(Error::NotFound(format!("어민 {}", cmd.fisherman_id)));
    }
    store.create_item(cmd, now).await
}

/// 상품 상태 변경. Sold에서 되돌릴 수 없다.
pub async fn update_item_status(
    store: &impl ItemRepository,
    cache: &dyn Cache,
    item_id: i64,
    status: &str,
) -> Result<AuctionItem, Error> {
    info!(
        "{:<12} --> 상품 상태 변경 id: {}, status: {}",
        "Command", item_id, status
    );
    let status: ItemStatus = status.parse()?;
    let current = store
        .find_item(item_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("상품 {}", item_id)))?;
    if current.status == ItemStatus::Sold && status != ItemStatus::Sold {
        return Err(Error::Conflict(format!(
            "낙찰된 상품 {}의 상태는 되돌릴 수 없습니다.",
            item_id
        )));
    }

    let item = match store.update_item_status(item_id, status).await? {
        Some(item) => item,
        None => {
            return match store.find_item(item_id).await? {
                Some(_) => Err(Error::Conflict(format!(
                    "낙찰된 상품 {}의 상태는 되돌릴 수 없습니다.",
                    item_id
                ))),
                None => Err(Error::NotFound(format!("상품 {}", item_id))),
            };
        }
    };
    cache::invalidate_best_effort(cache, &cache::item_key(item_id)).await;
    Ok(item)
}

// endregion: --- Item Commands
