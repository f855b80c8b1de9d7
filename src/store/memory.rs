/// 프로세스 내 저장소
/// 트랜잭션 쓰기는 MemoryTx에 모아 두었다가 commit 시점에 한 번에 반영한다.
/// 커밋 전에는 다른 호출자에게 보이지 않고, 핸들을 버리면 롤백된다.
// region:    --- Imports
use super::{
    AuctionRepository, BidRepository, InvoiceRepository, ItemRepository, PartyRepository,
    TransactionStore, VenueRepository,
};
use crate::auction::model::{
    Auction, AuctionItem, AuctionStatus, Buyer, Fisherman, ItemStatus, NewAuction, NewItem,
    NewVenue, Venue,
};
use crate::bidding::model::{pick_highest, Bid, HighestBid, ItemListing, PlaceBidCommand};
use crate::error::Error;
use crate::invoice::BuyerTotal;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct MemoryState {
    venues: BTreeMap<i64, Venue>,
    auctions: BTreeMap<i64, Auction>,
    items: BTreeMap<i64, AuctionItem>,
    bids: Vec<Bid>,
    buyers: BTreeMap<i64, Buyer>,
    fishermen: BTreeMap<i64, Fisherman>,
}

impl MemoryState {
    fn auction_has_bids(&self, auction_id: i64) -> bool {
        self.bids.iter().any(|bid| {
            self.items
                .get(&bid.item_id)
                .is_some_and(|item| item.auction_id == auction_id)
        })
    }
}

enum StagedWrite {
    ItemStatus { id: i64, status: ItemStatus },
    Bid(Bid),
}

/// 커밋 전 쓰기 목록
#[derive(Default)]
pub struct MemoryTx {
    writes: Vec<StagedWrite>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    next_id: AtomicI64,
    fail_next_bid_insert: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 입찰 기록 추가를 실패시킨다 (장애 주입)
    pub fn fail_next_bid_insert(&self) {
        self.fail_next_bid_insert.store(true, Ordering::SeqCst);
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, Error> {
        Ok(MemoryTx::default())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), Error> {
        let mut state = self.state();

        // 참조 대상이 커밋 전에 사라졌으면 아무것도 반영하지 않는다
        for write in &tx.writes {
            let item_id = match write {
                StagedWrite::ItemStatus { id, .. } => *id,
                StagedWrite::Bid(bid) => bid.item_id,
            };
            if !state.items.contains_key(&item_id) {
                return Err(Error::Conflict(format!("상품 {}이(가) 삭제되었습니다.", item_id)));
            }
        }

        for write in tx.writes {
            match write {
                StagedWrite::ItemStatus { id, status } => {
                    if let Some(item) = state.items.get_mut(&id) {
                        item.status = status;
                    }
                }
                StagedWrite::Bid(bid) => state.bids.push(bid),
            }
        }
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), Error> {
        drop(tx);
        Ok(())
    }
}

#[async_trait]
impl VenueRepository for MemoryStore {
    async fn create_venue(&self, venue: NewVenue) -> Result<Venue, Error> {
        let venue = Venue {
            id: self.next_id(),
            name: venue.name,
            location: venue.location,
            description: venue.description,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.state().venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn find_venue(&self, id: i64) -> Result<Option<Venue>, Error> {
        Ok(self
            .state()
            .venues
            .get(&id)
            .filter(|venue| venue.deleted_at.is_none())
            .cloned())
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, Error> {
        Ok(self
            .state()
            .venues
            .values()
            .filter(|venue| venue.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn soft_delete_venue(&self, id: i64, now: DateTime<Utc>) -> Result<(), Error> {
        let mut state = self.state();
        if !state
            .venues
            .get(&id)
            .is_some_and(|venue| venue.deleted_at.is_none())
        {
            return Err(Error::NotFound(format!("경매장 {}", id)));
        }

        let has_bids = state
            .auctions
            .values()
            .filter(|auction| auction.venue_id == id)
            .any(|auction| state.auction_has_bids(auction.id));
        if has_bids {
            return Err(Error::Conflict(format!(
                "경매장 {}의 상품에 입찰 기록이 있습니다.",
                id
            )));
        }

        if let Some(venue) = state.venues.get_mut(&id) {
            venue.deleted_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl AuctionRepository for MemoryStore {
    async fn create_auction(
        &self,
        auction: NewAuction,
        now: DateTime<Utc>,
    ) -> Result<Auction, Error> {
        let id = self.next_id();
        let mut state = self.state();
        if !state.venues.contains_key(&auction.venue_id) {
            return Err(Error::Conflict(format!(
                "경매장 {}이(가) 존재하지 않습니다.",
                auction.venue_id
            )));
        }
        let auction = Auction {
            id,
            venue_id: auction.venue_id,
            auction_date: auction.auction_date,
            start_time: auction.start_time,
            end_time: auction.end_time,
            status: auction.status.unwrap_or(AuctionStatus::Scheduled),
            created_at: now,
            updated_at: now,
        };
        state.auctions.insert(id, auction.clone());
        Ok(auction)
    }

    async fn find_auction(&self, id: i64) -> Result<Option<Auction>, Error> {
        Ok(self.state().auctions.get(&id).cloned())
    }

    async fn list_auctions(&self) -> Result<Vec<Auction>, Error> {
        let mut auctions: Vec<Auction> = self.state().auctions.values().cloned().collect();
        auctions.sort_by(|a, b| {
            b.auction_date
                .cmp(&a.auction_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(auctions)
    }

    async fn list_open_auctions(&self) -> Result<Vec<Auction>, Error> {
        Ok(self
            .state()
            .auctions
            .values()
            .filter(|auction| !auction.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn update_auction_status(
        &self,
        id: i64,
        status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Auction>, Error> {
        Ok(self
            .state()
            .auctions
            .get_mut(&id)
            .filter(|auction| !auction.status.is_terminal())
            .map(|auction| {
                auction.status = status;
                auction.updated_at = now;
                auction.clone()
            }))
    }

    async fn complete_auction(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Auction>, Error> {
        Ok(self.state().auctions.get_mut(&id).map(|auction| {
            if !auction.status.is_terminal() {
                auction.status = AuctionStatus::Completed;
                auction.updated_at = now;
            }
            auction.clone()
        }))
    }

    async fn delete_auction(&self, id: i64) -> Result<(), Error> {
        let mut state = self.state();
        if !state.auctions.contains_key(&id) {
            return Err(Error::NotFound(format!("경매 {}", id)));
        }
        if state.auction_has_bids(id) {
            return Err(Error::Conflict(format!(
                "경매 {}의 상품에 입찰 기록이 있습니다.",
                id
            )));
        }
        state.auctions.remove(&id);
        state.items.retain(|_, item| item.auction_id != id);
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn create_item(&self, item: NewItem, now: DateTime<Utc>) -> Result<AuctionItem, Error> {
        let id = self.next_id();
        let mut state = self.state();
        if !state.auctions.contains_key(&item.auction_id)
            || !state.fishermen.contains_key(&item.fisherman_id)
        {
            return Err(Error::Conflict(
                "경매 또는 어민이 존재하지 않습니다.".to_string(),
            ));
        }
        let item = AuctionItem {
            id,
            auction_id: item.auction_id,
            fisherman_id: item.fisherman_id,
            fish_type: item.fish_type,
            quantity: item.quantity,
            unit: item.unit,
            status: item.status.unwrap_or(ItemStatus::Pending),
            sort_order: item.sort_order,
            created_at: now,
        };
        state.items.insert(id, item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: i64) -> Result<Option<AuctionItem>, Error> {
        Ok(self.state().items.get(&id).cloned())
    }

    async fn list_item_listings(&self, auction_id: i64) -> Result<Vec<ItemListing>, Error> {
        let state = self.state();
        let mut items: Vec<&AuctionItem> = state
            .items
            .values()
            .filter(|item| item.auction_id == auction_id)
            .collect();
        items.sort_by_key(|item| (item.sort_order, item.id));

        Ok(items
            .into_iter()
            .map(|item| {
                let highest = pick_highest(state.bids.iter().filter(|bid| bid.item_id == item.id));
                ItemListing::new(item.clone(), highest)
            })
            .collect())
    }

    async fn update_item_status(
        &self,
        id: i64,
        status: ItemStatus,
    ) -> Result<Option<AuctionItem>, Error> {
        Ok(self
            .state()
            .items
            .get_mut(&id)
            .filter(|item| item.status != ItemStatus::Sold || status == ItemStatus::Sold)
            .map(|item| {
                item.status = status;
                item.clone()
            }))
    }

    async fn set_item_status_in(
        &self,
        tx: &mut Self::Tx,
        id: i64,
        status: ItemStatus,
    ) -> Result<(), Error> {
        if !self.state().items.contains_key(&id) {
            return Err(Error::NotFound(format!("상품 {}", id)));
        }
        tx.writes.push(StagedWrite::ItemStatus { id, status });
        Ok(())
    }
}

#[async_trait]
impl BidRepository for MemoryStore {
    async fn insert_bid_in(
        &self,
        tx: &mut Self::Tx,
        cmd: &PlaceBidCommand,
        now: DateTime<Utc>,
    ) -> Result<Bid, Error> {
        if self.fail_next_bid_insert.swap(false, Ordering::SeqCst) {
            return Err(Error::Internal("입찰 기록 추가 실패 (주입된 장애)".to_string()));
        }
        {
            let state = self.state();
            if !state.items.contains_key(&cmd.item_id) || !state.buyers.contains_key(&cmd.buyer_id)
            {
                return Err(Error::Conflict(
                    "상품 또는 구매자가 존재하지 않습니다.".to_string(),
                ));
            }
        }
        let bid = Bid {
            id: self.next_id(),
            item_id: cmd.item_id,
            buyer_id: cmd.buyer_id,
            price: cmd.price,
            created_at: now,
        };
        tx.writes.push(StagedWrite::Bid(bid.clone()));
        Ok(bid)
    }

    async fn list_bids_for_item(&self, item_id: i64) -> Result<Vec<Bid>, Error> {
        let mut bids: Vec<Bid> = self
            .state()
            .bids
            .iter()
            .filter(|bid| bid.item_id == item_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn highest_bid(&self, item_id: i64) -> Result<Option<HighestBid>, Error> {
        let state = self.state();
        Ok(pick_highest(
            state.bids.iter().filter(|bid| bid.item_id == item_id),
        ))
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn buyer_totals(&self) -> Result<Vec<BuyerTotal>, Error> {
        let state = self.state();
        let mut sums: BTreeMap<i64, i64> = BTreeMap::new();
        for bid in &state.bids {
            let sum = sums.entry(bid.buyer_id).or_insert(0);
            *sum = sum.checked_add(bid.price).ok_or_else(|| {
                Error::Internal(format!("구매자 {}의 합계가 범위를 넘었습니다.", bid.buyer_id))
            })?;
        }

        Ok(sums
            .into_iter()
            .filter_map(|(buyer_id, total_price)| {
                state.buyers.get(&buyer_id).map(|buyer| BuyerTotal {
                    buyer_id,
                    buyer_name: buyer.name.clone(),
                    total_price,
                })
            })
            .collect())
    }
}

#[async_trait]
impl PartyRepository for MemoryStore {
    async fn create_buyer(&self, name: &str, now: DateTime<Utc>) -> Result<Buyer, Error> {
        let buyer = Buyer {
            id: self.next_id(),
            name: name.to_string(),
            created_at: now,
        };
        self.state().buyers.insert(buyer.id, buyer.clone());
        Ok(buyer)
    }

    async fn find_buyer(&self, id: i64) -> Result<Option<Buyer>, Error> {
        Ok(self.state().buyers.get(&id).cloned())
    }

    async fn create_fisherman(&self, name: &str, now: DateTime<Utc>) -> Result<Fisherman, Error> {
        let fisherman = Fisherman {
            id: self.next_id(),
            name: name.to_string(),
            created_at: now,
        };
        self.state().fishermen.insert(fisherman.id, fisherman.clone());
        Ok(fisherman)
    }

    async fn find_fisherman(&self, id: i64) -> Result<Option<Fisherman>, Error> {
        Ok(self.state().fishermen.get(&id).cloned())
    }
}
// endregion: --- Memory Store
