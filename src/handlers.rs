// region:    --- Imports
use crate::auction::commands;
use crate::auction::model::{
    Auction, AuctionItem, Buyer, Fisherman, NewAuction, NewItem, NewVenue, Venue,
};
use crate::bidding::commands::handle_place_bid;
use crate::bidding::model::{Bid, ItemListing, PlaceBidCommand};
use crate::cache::Cache;
use crate::error::{Error, ErrorKind};
use crate::invoice::{self, InvoiceLine};
use crate::query;
use crate::session::{AdminSession, BuyerSession};
use crate::store::Store;
use axum::async_trait;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// endregion: --- Imports

// region:    --- App State
pub struct AppState<S> {
    pub store: Arc<S>,
    pub cache: Arc<dyn Cache>,
    pub cache_ttl: Duration,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }
}
// endregion: --- App State

// region:    --- Request Bodies

/// JSON 본문 추출. 추출 실패도 공통 에러 형식(400)으로 응답한다.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// 입찰 요청 (구매자 ID는 세션에서)
#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub item_id: i64,
    pub price: i64,
}

/// 상태 변경 요청
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// endregion: --- Request Bodies

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid<S: Store>(
    State(state): State<AppState<S>>,
    session: BuyerSession,
    ValidJson(req): ValidJson<PlaceBidRequest>,
) -> Result<(StatusCode, Json<Bid>), Error> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", req);

    // 세션의 구매자가 실제로 존재하는지 확인 (캐시 우선)
    query::handlers::get_buyer(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.cache_ttl,
        session.buyer_id,
    )
    .await
    .map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::Unauthorized("알 수 없는 구매자입니다.".to_string()),
        _ => e,
    })?;

    let cmd = PlaceBidCommand {
        item_id: req.item_id,
        buyer_id: session.buyer_id,
        price: req.price,
    };
    let bid = handle_place_bid(state.store.as_ref(), state.cache.as_ref(), cmd, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

/// 경매 상태 변경
pub async fn handle_update_auction_status<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    Path(auction_id): Path<i64>,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> Result<Json<Auction>, Error> {
    info!(
        "{:<12} --> 경매 상태 변경 admin: {}, id: {}",
        "Handler", session.admin_id, auction_id
    );
    let auction =
        commands::update_auction_status(state.store.as_ref(), auction_id, &req.status, Utc::now())
            .await?;
    Ok(Json(auction))
}

/// 경매장 생성
pub async fn handle_create_venue<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    ValidJson(req): ValidJson<NewVenue>,
) -> Result<(StatusCode, Json<Venue>), Error> {
    info!("{:<12} --> 경매장 생성 admin: {}", "Handler", session.admin_id);
    let venue = commands::create_venue(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

/// 경매장 삭제
pub async fn handle_delete_venue<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    Path(venue_id): Path<i64>,
) -> Result<StatusCode, Error> {
    info!(
        "{:<12} --> 경매장 삭제 admin: {}, id: {}",
        "Handler", session.admin_id, venue_id
    );
    commands::delete_venue(state.store.as_ref(), venue_id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 경매 생성
pub async fn handle_create_auction<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    ValidJson(req): ValidJson<NewAuction>,
) -> Result<(StatusCode, Json<Auction>), Error> {
    info!("{:<12} --> 경매 생성 admin: {}", "Handler", session.admin_id);
    let auction = commands::create_auction(state.store.as_ref(), req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 경매 삭제
pub async fn handle_delete_auction<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    Path(auction_id): Path<i64>,
) -> Result<StatusCode, Error> {
    info!(
        "{:<12} --> 경매 삭제 admin: {}, id: {}",
        "Handler", session.admin_id, auction_id
    );
    commands::delete_auction(state.store.as_ref(), state.cache.as_ref(), auction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 상품 등록
pub async fn handle_create_item<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    ValidJson(req): ValidJson<NewItem>,
) -> Result<(StatusCode, Json<AuctionItem>), Error> {
    info!("{:<12} --> 상품 등록 admin: {}", "Handler", session.admin_id);
    let item = commands::create_item(state.store.as_ref(), req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// 상품 상태 변경
pub async fn handle_update_item_status<S: Store>(
    State(state): State<AppState<S>>,
    session: AdminSession,
    Path(item_id): Path<i64>,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> Result<Json<AuctionItem>, Error> {
    info!(
        "{:<12} --> 상품 상태 변경 admin: {}, id: {}",
        "Handler", session.admin_id, item_id
    );
    let item = commands::update_item_status(
        state.store.as_ref(),
        state.cache.as_ref(),
        item_id,
        &req.status,
    )
    .await?;
    Ok(Json(item))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 경매 조회
pub async fn handle_get_auctions<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Auction>>, Error> {
    let auctions = query::handlers::get_all_auctions(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(auctions))
}

/// 경매 조회
pub async fn handle_get_auction<S: Store>(
    State(state): State<AppState<S>>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Auction>, Error> {
    let auction = query::handlers::get_auction(state.store.as_ref(), auction_id, Utc::now()).await?;
    Ok(Json(auction))
}

/// 경매 상품 목록 조회
pub async fn handle_get_auction_items<S: Store>(
    State(state): State<AppState<S>>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Vec<ItemListing>>, Error> {
    let items = query::handlers::get_auction_items(state.store.as_ref(), auction_id).await?;
    Ok(Json(items))
}

/// 상품 조회
pub async fn handle_get_item<S: Store>(
    State(state): State<AppState<S>>,
    Path(item_id): Path<i64>,
) -> Result<Json<AuctionItem>, Error> {
    let item = query::handlers::get_item(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.cache_ttl,
        item_id,
    )
    .await?;
    Ok(Json(item))
}

/// 상품 입찰 이력 조회
pub async fn handle_get_item_bids<S: Store>(
    State(state): State<AppState<S>>,
    Path(item_id): Path<i64>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = query::handlers::get_item_bids(state.store.as_ref(), item_id).await?;
    Ok(Json(bids))
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid<S: Store>(
    State(state): State<AppState<S>>,
    Path(item_id): Path<i64>,
) -> Result<Json<serde_json::Value>, Error> {
    let highest = query::handlers::get_highest_bid(state.store.as_ref(), item_id).await?;
    Ok(Json(serde_json::json!({
        "item_id": item_id,
        "highest_bid": highest.map(|h| h.price),
        "highest_bidder_id": highest.map(|h| h.buyer_id),
    })))
}

/// 청구서 조회
pub async fn handle_get_invoices<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<InvoiceLine>>, Error> {
    let invoices = invoice::list_invoices(state.store.as_ref()).await?;
    Ok(Json(invoices))
}

/// 모든 경매장 조회
pub async fn handle_get_venues<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Venue>>, Error> {
    let venues = query::handlers::get_all_venues(state.store.as_ref()).await?;
    Ok(Json(venues))
}

/// 경매장 조회
pub async fn handle_get_venue<S: Store>(
    State(state): State<AppState<S>>,
    Path(venue_id): Path<i64>,
) -> Result<Json<Venue>, Error> {
    let venue = query::handlers::get_venue(state.store.as_ref(), venue_id).await?;
    Ok(Json(venue))
}

/// 구매자 조회
pub async fn handle_get_buyer<S: Store>(
    State(state): State<AppState<S>>,
    Path(buyer_id): Path<i64>,
) -> Result<Json<Buyer>, Error> {
    let buyer = query::handlers::get_buyer(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.cache_ttl,
        buyer_id,
    )
    .await?;
    Ok(Json(buyer))
}

/// 어민 조회
pub async fn handle_get_fisherman<S: Store>(
    State(state): State<AppState<S>>,
    Path(fisherman_id): Path<i64>,
) -> Result<Json<Fisherman>, Error> {
    let fisherman = query::handlers::get_fisherman(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.cache_ttl,
        fisherman_id,
    )
    .await?;
    Ok(Json(fisherman))
}

/// 헬스 체크
pub async fn handle_health() -> &'static str {
    "ok"
}

// endregion: --- Query Handlers
