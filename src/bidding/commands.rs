/// 입찰(낙찰) 커맨드 처리
/// 상품 상태 Sold 전환과 입찰 기록 추가를 하나의 트랜잭션으로 묶는다.
/// 둘 중 하나라도 실패하면 전체를 롤백하므로, 외부에서는 두 변경이 항상 함께 보인다.
///
/// 같은 상품에 대한 동시 입찰은 막지 않는다. 두 트랜잭션 모두 Sold를 쓰고 각자 입찰 기록을 남기며,
/// 유효 낙찰가는 읽기 시점의 MAX(price)로 정해진다.
// region:    --- Imports
use super::model::{Bid, PlaceBidCommand};
use crate::auction::model::ItemStatus;
use crate::cache::{self, Cache};
use crate::error::Error;
use crate::store::{BidRepository, ItemRepository};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 입찰 처리
/// 트랜잭션 핸들은 이 함수가 소유하고 두 쓰기 작업에 직접 넘긴다.
/// 핸들이 커밋 없이 drop 되면(패닉, 요청 취소) 저장소가 롤백한다.
pub async fn handle_place_bid<S>(
    store: &S,
    cache: &dyn Cache,
    cmd: PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<Bid, Error>
where
    S: ItemRepository + BidRepository,
{
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    cmd.validate()?;

    let mut tx = store.begin().await?;
    let result = settle(store, &mut tx, &cmd, now).await;

    let bid = match result {
        Ok(bid) => {
            store.commit(tx).await?;
            bid
        }
        Err(e) => {
            warn!(
                "{:<12} --> 입찰 처리 실패, 롤백: item={}, error={}",
                "Command", cmd.item_id, e
            );
            if let Err(rollback_err) = store.rollback(tx).await {
                warn!("{:<12} --> 롤백 실패: {}", "Command", rollback_err);
            }
            return Err(e);
        }
    };

    cache::invalidate_best_effort(cache, &cache::item_key(cmd.item_id)).await;
    info!(
        "{:<12} --> 낙찰 기록 완료: bid={}, item={}, price={}",
        "Command", bid.id, bid.item_id, bid.price
    );
    Ok(bid)
}

async fn settle<S>(
    store: &S,
    tx: &mut S::Tx,
    cmd: &PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<Bid, Error>
where
    S: ItemRepository + BidRepository,
{
    store
        .set_item_status_in(tx, cmd.item_id, ItemStatus::Sold)
        .await?;
    store.insert_bid_in(tx, cmd, now).await
}

// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionItem, NewAuction, NewItem, NewVenue};
    use crate::cache::MemoryCache;
    use crate::error::ErrorKind;
    use crate::store::{AuctionRepository, MemoryStore, PartyRepository, VenueRepository};
    use chrono::NaiveDate;

    struct Fixture {
        store: MemoryStore,
        cache: MemoryCache,
        item: AuctionItem,
        buyer_ids: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let now = Utc::now();
        let venue = store
            .create_venue(NewVenue {
                name: "목포 수협".to_string(),
                location: "목포".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let auction = store
            .create_auction(
                NewAuction {
                    venue_id: venue.id,
                    auction_date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
                    start_time: None,
                    end_time: None,
                    status: None,
                },
                now,
            )
            .await
            .unwrap();
        let fisherman = store.create_fisherman("박선장", now).await.unwrap();
        let item = store
            .create_item(
                NewItem {
                    auction_id: auction.id,
                    fisherman_id: fisherman.id,
                    fish_type: "갈치".to_string(),
                    quantity: 5,
                    unit: "kg".to_string(),
                    status: None,
                    sort_order: 1,
                },
                now,
            )
            .await
            .unwrap();
        let mut buyer_ids = Vec::new();
        for name in ["가", "나", "다"] {
            buyer_ids.push(store.create_buyer(name, now).await.unwrap().id);
        }

        Fixture {
            store,
            cache: MemoryCache::new(),
            item,
            buyer_ids,
        }
    }

    fn cmd(item_id: i64, buyer_id: i64, price: i64) -> PlaceBidCommand {
        PlaceBidCommand {
            item_id,
            buyer_id,
            price,
        }
    }

    #[tokio::test]
    async fn settlement_marks_sold_and_records_bid() {
        let f = fixture().await;
        let bid = handle_place_bid(
            &f.store,
            &f.cache,
            cmd(f.item.id, f.buyer_ids[0], 5000),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(bid.price, 5000);
        let item = f.store.find_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(item.status, ItemStatus::Sold);
        assert_eq!(f.store.list_bids_for_item(f.item.id).await.unwrap(), vec![bid]);
    }

    #[tokio::test]
    async fn failed_bid_insert_rolls_back_status() {
        let f = fixture().await;
        f.store.fail_next_bid_insert();

        let result = handle_place_bid(
            &f.store,
            &f.cache,
            cmd(f.item.id, f.buyer_ids[0], 5000),
            Utc::now(),
        )
        .await;

        assert!(result.is_err());
        let item = f.store.find_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(f.store.list_bids_for_item(f.item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_input_never_opens_a_transaction() {
        let f = fixture().await;
        f.store.fail_next_bid_insert();

        let err = handle_place_bid(&f.store, &f.cache, cmd(f.item.id, f.buyer_ids[0], 0), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // 장애 주입 플래그가 소비되지 않았으므로 저장소까지 가지 않았다
        let err = handle_place_bid(
            &f.store,
            &f.cache,
            cmd(f.item.id, f.buyer_ids[0], 100),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let f = fixture().await;
        let err = handle_place_bid(&f.store, &f.cache, cmd(9999, f.buyer_ids[0], 100), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn second_bid_on_sold_item_is_still_recorded() {
        let f = fixture().await;
        for (buyer, price) in [(f.buyer_ids[0], 1000), (f.buyer_ids[1], 3000), (f.buyer_ids[2], 2000)] {
            handle_place_bid(&f.store, &f.cache, cmd(f.item.id, buyer, price), Utc::now())
                .await
                .unwrap();
        }

        assert_eq!(f.store.list_bids_for_item(f.item.id).await.unwrap().len(), 3);
        let highest = f.store.highest_bid(f.item.id).await.unwrap().unwrap();
        assert_eq!(highest.price, 3000);
        assert_eq!(highest.buyer_id, f.buyer_ids[1]);
    }

    #[tokio::test]
    async fn settlement_invalidates_cached_item() {
        let f = fixture().await;
        let key = cache::item_key(f.item.id);
        cache::set_json_best_effort(&f.cache, &key, &f.item, std::time::Duration::from_secs(60))
            .await;

        handle_place_bid(
            &f.store,
            &f.cache,
            cmd(f.item.id, f.buyer_ids[0], 700),
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(f.cache.get_raw(&key).await.unwrap().is_none());
    }
}
