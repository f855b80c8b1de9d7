// region:    --- Imports
use crate::auction::model::{Auction, AuctionItem, Buyer, Fisherman, Venue};
use crate::auction::status::reconcile;
use crate::bidding::model::{Bid, HighestBid, ItemListing};
use crate::cache::{self, Cache};
use crate::error::Error;
use crate::store::{AuctionRepository, BidRepository, ItemRepository, PartyRepository, VenueRepository};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Auction Queries

/// 경매 조회. 종료 시간이 지났으면 완료 처리 후 반환한다.
pub async fn get_auction(
    store: &impl AuctionRepository,
    auction_id: i64,
    now: DateTime<Utc>,
) -> Result<Auction, Error> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    let auction = store
        .find_auction(auction_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("경매 {}", auction_id)))?;
    reconcile(store, auction, now).await
}

/// 모든 경매 조회 (각각 보정 후 반환)
pub async fn get_all_auctions(
    store: &impl AuctionRepository,
    now: DateTime<Utc>,
) -> Result<Vec<Auction>, Error> {
    info!("{:<12} --> 모든 경매 조회", "Query");
    let auctions = store.list_auctions().await?;
    let mut reconciled = Vec::with_capacity(auctions.len());
    for auction in auctions {
        reconciled.push(reconcile(store, auction, now).await?);
    }
    Ok(reconciled)
}

/// 경매장 조회
pub async fn get_venue(store: &impl VenueRepository, venue_id: i64) -> Result<Venue, Error> {
    info!("{:<12} --> 경매장 조회 id: {}", "Query", venue_id);
    store
        .find_venue(venue_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("경매장 {}", venue_id)))
}

/// 모든 경매장 조회
pub async fn get_all_venues(store: &impl VenueRepository) -> Result<Vec<Venue>, Error> {
    info!("{:<12} --> 모든 경매장 조회", "Query");
    store.list_venues().await
}

// endregion: --- Auction Queries

// region:    --- Item Queries

/// 경매별 상품 목록 + 최고 입찰가. 입찰가는 캐시를 거치지 않고 항상 저장소에서 계산한다.
pub async fn get_auction_items<S>(store: &S, auction_id: i64) -> Result<Vec<ItemListing>, Error>
where
    S: AuctionRepository + ItemRepository,
{
    info!("{:<12} --> 경매 상품 목록 조회 auction: {}", "Query", auction_id);
    if store.find_auction(auction_id).await?.is_none() {
        return Err(Error::NotFound(format!("경매 {}", auction_id)));
    }
    store.list_item_listings(auction_id).await
}

/// 상품 캐시 항목의 최대 유지 시간.
/// 낙찰 커밋 전에 읽은 값이 무효화 뒤에 다시 저장될 수 있어, 그 값이 남는 시간을 이 값으로 제한한다.
pub const ITEM_CACHE_TTL_MAX: Duration = Duration::from_secs(5);

/// 상품 캐시 유지 시간 (설정값과 ITEM_CACHE_TTL_MAX 중 작은 쪽)
pub fn item_cache_ttl(configured: Duration) -> Duration {
    configured.min(ITEM_CACHE_TTL_MAX)
}

/// 상품 조회 (캐시 우선)
pub async fn get_item(
    store: &impl ItemRepository,
    cache: &dyn Cache,
    ttl: Duration,
    item_id: i64,
) -> Result<AuctionItem, Error> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", item_id);
    read_through(cache, &cache::item_key(item_id), item_cache_ttl(ttl), || {
        store.find_item(item_id)
    })
        .await?
        .ok_or_else(|| Error::NotFound(format!("상품 {}", item_id)))
}

/// 상품 입찰 이력 조회
pub async fn get_item_bids<S>(store: &S, item_id: i64) -> Result<Vec<Bid>, Error>
where
    S: ItemRepository + BidRepository,
{
    info!("{:<12} --> 상품 입찰 이력 조회 id: {}", "Query", item_id);
    if store.find_item(item_id).await?.is_none() {
        return Err(Error::NotFound(format!("상품 {}", item_id)));
    }
    store.list_bids_for_item(item_id).await
}

/// 최고 입찰가 조회. 입찰이 없으면 None.
pub async fn get_highest_bid(
    store: &impl BidRepository,
    item_id: i64,
) -> Result<Option<HighestBid>, Error> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", item_id);
    store.highest_bid(item_id).await
}

// endregion: --- Item Queries

// region:    --- Party Queries

/// 구매자 조회 (캐시 우선)
pub async fn get_buyer(
    store: &impl PartyRepository,
    cache: &dyn Cache,
    ttl: Duration,
    buyer_id: i64,
) -> Result<Buyer, Error> {
    read_through(cache, &cache::buyer_key(buyer_id), ttl, || store.find_buyer(buyer_id))
        .await?
        .ok_or_else(|| Error::NotFound(format!("구매자 {}", buyer_id)))
}

/// 어민 조회 (캐시 우선)
pub async fn get_fisherman(
    store: &impl PartyRepository,
    cache: &dyn Cache,
    ttl: Duration,
    fisherman_id: i64,
) -> Result<Fisherman, Error> {
    read_through(cache, &cache::fisherman_key(fisherman_id), ttl, || {
        store.find_fisherman(fisherman_id)
    })
    .await?
    .ok_or_else(|| Error::NotFound(format!("어민 {}", fisherman_id)))
}

// endregion: --- Party Queries

// region:    --- Read Through

/// 캐시 조회 후 미스면 저장소에서 읽어 캐시를 채운다.
/// 캐시 장애는 미스로 취급한다.
///
/// 저장소 읽기와 캐시 쓰기 사이에 다른 요청이 커밋하고 키를 무효화하면,
/// 그 이전 값이 ttl 동안 캐시에 남을 수 있다. 자주 바뀌는 항목은 짧은 ttl을 넘긴다.
async fn read_through<T, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<Option<T>, Error>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, Error>>,
{
    match cache::get_json::<T>(cache, key).await {
        Ok(Some(value)) => {
            debug!("{:<12} --> 캐시 적중 key={}", "Cache", key);
            return Ok(Some(value));
        }
        Ok(None) => debug!("{:<12} --> 캐시 미스 key={}", "Cache", key),
        Err(e) => warn!("{:<12} --> 캐시 조회 실패 key={}: {}", "Cache", key, e),
    }

    let loaded = load().await?;
    if let Some(value) = &loaded {
        cache::set_json_best_effort(cache, key, value, ttl).await;
    }
    Ok(loaded)
}

// endregion: --- Read Through
