/// 저장소 트레이트
/// 트랜잭션 핸들(Tx)은 호출자가 직접 소유하고 쓰기 메서드에 명시적으로 넘긴다.
// region:    --- Imports
use crate::auction::model::{
    Auction, AuctionItem, AuctionStatus, Buyer, Fisherman, ItemStatus, NewAuction, NewItem,
    NewVenue, Venue,
};
use crate::bidding::model::{Bid, HighestBid, ItemListing, PlaceBidCommand};
use crate::error::Error;
use crate::invoice::BuyerTotal;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;
mod queries;

pub use memory::MemoryStore;
pub use postgres::PgStore;
// endregion: --- Modules

// region:    --- Traits

/// 트랜잭션 시작/커밋/롤백
#[async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, Error>;
    async fn commit(&self, tx: Self::Tx) -> Result<(), Error>;
    async fn rollback(&self, tx: Self::Tx) -> Result<(), Error>;
}

/// 경매장 저장소
#[async_trait]
pub trait VenueRepository: Send + Sync + 'static {
    async fn create_venue(&self, venue: NewVenue) -> Result<Venue, Error>;
    /// 논리 삭제된 경매장은 None
    async fn find_venue(&self, id: i64) -> Result<Option<Venue>, Error>;
    async fn list_venues(&self) -> Result<Vec<Venue>, Error>;
    /// 하위 상품에 입찰이 하나라도 있으면 Conflict, 없으면 deleted_at 기록
    async fn soft_delete_venue(&self, id: i64, now: DateTime<Utc>) -> Result<(), Error>;
}

/// 경매 저장소
#[async_trait]
pub trait AuctionRepository: Send + Sync + 'static {
    async fn create_auction(&self, auction: NewAuction, now: DateTime<Utc>)
        -> Result<Auction, Error>;
    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, Error>;
    async fn list_auctions(&self) -> Result<Vec<Auction>, Error>;
    /// 종료 상태가 아닌 경매만
    async fn list_open_auctions(&self) -> Result<Vec<Auction>, Error>;
    /// 종료 상태인 경매는 바꾸지 않고 None. 없는 경매도 None.
    async fn update_auction_status(
        &self,
        id: i64,
        status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Auction>, Error>;
    /// 종료 상태가 아닐 때만 Completed로 바꾼다. 몇 번을 호출해도 결과는 같다.
    async fn complete_auction(&self, id: i64, now: DateTime<Utc>)
        -> Result<Option<Auction>, Error>;
    /// 상품까지 함께 삭제. 입찰이 남아 있으면 Conflict.
    async fn delete_auction(&self, id: i64) -> Result<(), Error>;
}

/// 경매 상품 저장소
#[async_trait]
pub trait ItemRepository: TransactionStore {
    async fn create_item(&self, item: NewItem, now: DateTime<Utc>) -> Result<AuctionItem, Error>;
    async fn find_item(&self, id: i64) -> Result<Option<AuctionItem>, Error>;
    async fn list_item_listings(&self, auction_id: i64) -> Result<Vec<ItemListing>, Error>;
    /// Sold 상품을 다른 상태로 바꾸려 하면 None. 없는 상품도 None.
    async fn update_item_status(
        &self,
        id: i64,
        status: ItemStatus,
    ) -> Result<Option<AuctionItem>, Error>;
    /// 트랜잭션 안에서 상태 변경. 상품이 없으면 NotFound.
    async fn set_item_status_in(
        &self,
        tx: &mut Self::Tx,
        id: i64,
        status: ItemStatus,
    ) -> Result<(), Error>;
}

/// 입찰(거래) 저장소
#[async_trait]
pub trait BidRepository: TransactionStore {
    async fn insert_bid_in(
        &self,
        tx: &mut Self::Tx,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
    ) -> Result<Bid, Error>;
    async fn list_bids_for_item(&self, item_id: i64) -> Result<Vec<Bid>, Error>;
    async fn highest_bid(&self, item_id: i64) -> Result<Option<HighestBid>, Error>;
}

/// 청구서 집계용 저장소
#[async_trait]
pub trait InvoiceRepository: Send + Sync + 'static {
    async fn buyer_totals(&self) -> Result<Vec<BuyerTotal>, Error>;
}

/// 구매자/어민 저장소 (등록 절차는 외부 서비스 담당)
#[async_trait]
pub trait PartyRepository: Send + Sync + 'static {
    async fn create_buyer(&self, name: &str, now: DateTime<Utc>) -> Result<Buyer, Error>;
    async fn find_buyer(&self, id: i64) -> Result<Option<Buyer>, Error>;
    async fn create_fisherman(&self, name: &str, now: DateTime<Utc>) -> Result<Fisherman, Error>;
    async fn find_fisherman(&self, id: i64) -> Result<Option<Fisherman>, Error>;
}

/// 서비스 전체가 사용하는 저장소 묶음
pub trait Store:
    VenueRepository
    + AuctionRepository
    + ItemRepository
    + BidRepository
    + InvoiceRepository
    + PartyRepository
{
}

impl<T> Store for T where
    T: VenueRepository
        + AuctionRepository
        + ItemRepository
        + BidRepository
        + InvoiceRepository
        + PartyRepository
{
}

// endregion: --- Traits
