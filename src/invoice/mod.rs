/// 구매자별 청구서 집계
/// 거래 원장(bids)과 구매자 테이블만으로 언제든 다시 계산할 수 있으며 저장하지 않는다.
// region:    --- Imports
use crate::error::Error;
use crate::store::InvoiceRepository;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

/// 세율(%)
pub const TAX_RATE_PERCENT: i64 = 8;

/// 구매자별 낙찰 금액 합계 (세전)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BuyerTotal {
    pub buyer_id: i64,
    pub buyer_name: String,
    pub total_price: i64,
}

/// 청구서 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub buyer_id: i64,
    pub buyer_name: String,
    pub total_amount: i64,
}

/// 세금 포함 금액. 소수점 이하는 버린다. i64 범위를 넘으면 Internal.
pub fn with_tax(total_price: i64) -> Result<i64, Error> {
    let taxed = i128::from(total_price) * i128::from(100 + TAX_RATE_PERCENT);
    i64::try_from(taxed.div_euclid(100)).map_err(|_| {
        Error::Internal(format!("세금 포함 금액이 범위를 넘었습니다: {}", total_price))
    })
}

impl TryFrom<BuyerTotal> for InvoiceLine {
    type Error = Error;

    fn try_from(total: BuyerTotal) -> Result<Self, Self::Error> {
        Ok(Self {
            total_amount: with_tax(total.total_price)?,
            buyer_id: total.buyer_id,
            buyer_name: total.buyer_name,
        })
    }
}

/// 청구서 목록 조회
pub async fn list_invoices(store: &impl InvoiceRepository) -> Result<Vec<InvoiceLine>, Error> {
    info!("{:<12} --> 청구서 집계", "Query");
    let totals = store.buyer_totals().await?;
    totals.into_iter().map(InvoiceLine::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_added_and_truncated() {
        assert_eq!(with_tax(1000).unwrap(), 1080);
        // 999 * 1.08 = 1078.92
        assert_eq!(with_tax(999).unwrap(), 1078);
        assert_eq!(with_tax(0).unwrap(), 0);
        assert_eq!(with_tax(12_345).unwrap(), 13_332);
    }

    #[test]
    fn overflowing_total_is_internal_error() {
        let err = with_tax(i64::MAX).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
    }

    #[test]
    fn line_carries_buyer_identity() {
        let line = InvoiceLine::try_from(BuyerTotal {
            buyer_id: 7,
            buyer_name: "수산상회".to_string(),
            total_price: 5000,
        })
        .unwrap();
        assert_eq!(line.buyer_id, 7);
        assert_eq!(line.buyer_name, "수산상회");
        assert_eq!(line.total_amount, 5400);
    }

    #[tokio::test]
    async fn overflowing_buyer_sum_is_internal_error() {
        use crate::auction::model::{NewAuction, NewItem, NewVenue};
        use crate::bidding::model::PlaceBidCommand;
        use crate::store::{
            AuctionRepository, BidRepository, ItemRepository, MemoryStore, PartyRepository,
            TransactionStore, VenueRepository,
        };
        use chrono::{NaiveDate, Utc};

        let store = MemoryStore::new();
        let venue = store
            .create_venue(NewVenue {
                name: "군산".to_string(),
                location: "군산".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let auction = store
            .create_auction(
                NewAuction {
                    venue_id: venue.id,
                    auction_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                    start_time: None,
                    end_time: None,
                    status: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        let fisherman = store.create_fisherman("서어부", Utc::now()).await.unwrap();
        let item = store
            .create_item(
                NewItem {
                    auction_id: auction.id,
                    fisherman_id: fisherman.id,
                    fish_type: "꽃게".to_string(),
                    quantity: 1,
                    unit: "kg".to_string(),
                    status: None,
                    sort_order: 0,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        let buyer = store.create_buyer("대형상회", Utc::now()).await.unwrap();

        for _ in 0..2 {
            let cmd = PlaceBidCommand {
                item_id: item.id,
                buyer_id: buyer.id,
                price: i64::MAX,
            };
            let mut tx = store.begin().await.unwrap();
            store.insert_bid_in(&mut tx, &cmd, Utc::now()).await.unwrap();
            store.commit(tx).await.unwrap();
        }

        let err = list_invoices(&store).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
    }
}
