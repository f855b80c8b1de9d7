// region:    --- Imports
use super::queries;
use super::{
    AuctionRepository, BidRepository, InvoiceRepository, ItemRepository, PartyRepository,
    TransactionStore, VenueRepository,
};
use crate::auction::model::{
    Auction, AuctionItem, AuctionStatus, Buyer, Fisherman, ItemStatus, NewAuction, NewItem,
    NewVenue, Venue,
};
use crate::bidding::model::{Bid, HighestBid, ItemListing, PlaceBidCommand};
use crate::database::DatabaseManager;
use crate::error::Error;
use crate::invoice::BuyerTotal;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Postgres Store
/// PostgreSQL 저장소
#[derive(Clone)]
pub struct PgStore {
    db_manager: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl TransactionStore for PgStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, Error> {
        Ok(self.db_manager.pool().begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), Error> {
        Ok(tx.commit().await?)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), Error> {
        Ok(tx.rollback().await?)
    }
}

#[async_trait]
impl VenueRepository for PgStore {
    async fn create_venue(&self, venue: NewVenue) -> Result<Venue, Error> {
        let venue = sqlx::query_as::<_, Venue>(queries::INSERT_VENUE)
            .bind(&venue.name)
            .bind(&venue.location)
            .bind(&venue.description)
            .bind(Utc::now())
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(venue)
    }

    async fn find_venue(&self, id: i64) -> Result<Option<Venue>, Error> {
        let venue = sqlx::query_as::<_, Venue>(queries::GET_VENUE)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(venue)
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, Error> {
        let venues = sqlx::query_as::<_, Venue>(queries::GET_ALL_VENUES)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(venues)
    }

    async fn soft_delete_venue(&self, id: i64, now: DateTime<Utc>) -> Result<(), Error> {
        info!("{:<12} --> 경매장 논리 삭제 id: {}", "Store", id);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let locked: Option<i64> = sqlx::query_scalar(queries::LOCK_VENUE)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if locked.is_none() {
                        return Err(Error::NotFound(format!("경매장 {}", id)));
                    }

                    let has_bids: bool = sqlx::query_scalar(queries::VENUE_HAS_BIDS)
                        .bind(id)
                        .fetch_one(&mut **tx)
                        .await?;
                    if has_bids {
                        return Err(Error::Conflict(format!(
                            "경매장 {}의 상품에 입찰 기록이 있습니다.",
                            id
                        )));
                    }

                    sqlx::query(queries::SOFT_DELETE_VENUE)
                        .bind(id)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                    Ok(())
                })
            })
            .await
    }
}

#[async_trait]
impl AuctionRepository for PgStore {
    async fn create_auction(
        &self,
        auction: NewAuction,
        now: DateTime<Utc>,
    ) -> Result<Auction, Error> {
        let auction = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
            .bind(auction.venue_id)
            .bind(auction.auction_date)
            .bind(auction.start_time)
            .bind(auction.end_time)
            .bind(auction.status.unwrap_or(AuctionStatus::Scheduled))
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(auction)
    }

    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, Error> {
        let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(auction)
    }

    async fn list_auctions(&self) -> Result<Vec<Auction>, Error> {
        let auctions = sqlx::query_as::<_, Auction>(queries::GET_ALL_AUCTIONS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(auctions)
    }

    async fn list_open_auctions(&self) -> Result<Vec<Auction>, Error> {
        let auctions = sqlx::query_as::<_, Auction>(queries::GET_OPEN_AUCTIONS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(auctions)
    }

    async fn update_auction_status(
        &self,
        id: i64,
        status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Auction>, Error> {
        let auction = sqlx::query_as::<_, Auction>(queries::UPDATE_AUCTION_STATUS)
            .bind(id)
            .bind(status)
            .bind(now)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(auction)
    }

    async fn complete_auction(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Auction>, Error> {
        let result = sqlx::query(queries::COMPLETE_AUCTION)
            .bind(id)
            .bind(now)
            .execute(self.db_manager.pool())
            .await?;
        debug!(
            "{:<12} --> 경매 완료 처리 id: {}, 변경 행 수: {}",
            "Store",
            id,
            result.rows_affected()
        );
        self.find_auction(id).await
    }

    async fn delete_auction(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query(queries::DELETE_AUCTION)
            .bind(id)
            .execute(self.db_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("경매 {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for PgStore {
    async fn create_item(&self, item: NewItem, now: DateTime<Utc>) -> Result<AuctionItem, Error> {
        let item = sqlx::query_as::<_, AuctionItem>(queries::INSERT_ITEM)
            .bind(item.auction_id)
            .bind(item.fisherman_id)
            .bind(&item.fish_type)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.status.unwrap_or(ItemStatus::Pending))
            .bind(item.sort_order)
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(item)
    }

    async fn find_item(&self, id: i64) -> Result<Option<AuctionItem>, Error> {
        let item = sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(item)
    }

    async fn list_item_listings(&self, auction_id: i64) -> Result<Vec<ItemListing>, Error> {
        let listings = sqlx::query_as::<_, ItemListing>(queries::GET_ITEM_LISTINGS)
            .bind(auction_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(listings)
    }

    async fn update_item_status(
        &self,
        id: i64,
        status: ItemStatus,
    ) -> Result<Option<AuctionItem>, Error> {
        let item = sqlx::query_as::<_, AuctionItem>(queries::UPDATE_ITEM_STATUS)
            .bind(id)
            .bind(status)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(item)
    }

    async fn set_item_status_in(
        &self,
        tx: &mut Self::Tx,
        id: i64,
        status: ItemStatus,
    ) -> Result<(), Error> {
        let result = sqlx::query(queries::SET_ITEM_STATUS)
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("상품 {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BidRepository for PgStore {
    async fn insert_bid_in(
        &self,
        tx: &mut Self::Tx,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
    ) -> Result<Bid, Error> {
        let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
            .bind(cmd.item_id)
            .bind(cmd.buyer_id)
            .bind(cmd.price)
            .bind(now)
            .fetch_one(&mut **tx)
            .await?;
        Ok(bid)
    }

    async fn list_bids_for_item(&self, item_id: i64) -> Result<Vec<Bid>, Error> {
        let bids = sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS)
            .bind(item_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(bids)
    }

    async fn highest_bid(&self, item_id: i64) -> Result<Option<HighestBid>, Error> {
        let highest = sqlx::query_as::<_, HighestBid>(queries::GET_HIGHEST_BID)
            .bind(item_id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(highest)
    }
}

#[async_trait]
impl InvoiceRepository for PgStore {
    async fn buyer_totals(&self) -> Result<Vec<BuyerTotal>, Error> {
        let totals = sqlx::query_as::<_, BuyerTotal>(queries::GET_BUYER_TOTALS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(totals)
    }
}

#[async_trait]
impl PartyRepository for PgStore {
    async fn create_buyer(&self, name: &str, now: DateTime<Utc>) -> Result<Buyer, Error> {
        let buyer = sqlx::query_as::<_, Buyer>(queries::INSERT_BUYER)
            .bind(name)
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(buyer)
    }

    async fn find_buyer(&self, id: i64) -> Result<Option<Buyer>, Error> {
        let buyer = sqlx::query_as::<_, Buyer>(queries::GET_BUYER)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(buyer)
    }

    async fn create_fisherman(&self, name: &str, now: DateTime<Utc>) -> Result<Fisherman, Error> {
        let fisherman = sqlx::query_as::<_, Fisherman>(queries::INSERT_FISHERMAN)
            .bind(name)
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(fisherman)
    }

    async fn find_fisherman(&self, id: i64) -> Result<Option<Fisherman>, Error> {
        let fisherman = sqlx::query_as::<_, Fisherman>(queries::GET_FISHERMAN)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(fisherman)
    }
}
// endregion: --- Postgres Store
