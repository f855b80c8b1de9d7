use crate::auction::model::AuctionItem;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 입찰(거래) 모델. 생성 후 수정/삭제하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: i64,
    pub buyer_id: i64,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// 입찰 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidCommand {
    pub item_id: i64,
    pub buyer_id: i64,
    pub price: i64,
}

impl PlaceBidCommand {
    /// 트랜잭션 시작 전 입력 검증
    pub fn validate(&self) -> Result<(), Error> {
        if self.item_id <= 0 {
            return Err(Error::Validation("item_id는 0보다 커야 합니다.".to_string()));
        }
        if self.buyer_id <= 0 {
            return Err(Error::Validation("buyer_id는 0보다 커야 합니다.".to_string()));
        }
        if self.price <= 0 {
            return Err(Error::Validation("입찰 금액은 0보다 커야 합니다.".to_string()));
        }
        Ok(())
    }
}

/// 상품별 최고 입찰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HighestBid {
    pub price: i64,
    pub buyer_id: i64,
}

/// 최고 입찰가가 포함된 상품 목록 행. 입찰이 없으면 highest_bid는 None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: AuctionItem,
    pub highest_bid: Option<i64>,
    pub highest_bidder_id: Option<i64>,
}

impl ItemListing {
    pub fn new(item: AuctionItem, highest: Option<HighestBid>) -> Self {
        Self {
            item,
            highest_bid: highest.map(|h| h.price),
            highest_bidder_id: highest.map(|h| h.buyer_id),
        }
    }
}

/// 입찰 가운데 최고가를 고른다. 같은 금액이면 먼저 들어온 입찰(id가 작은 쪽)이 이긴다.
pub fn pick_highest<'a>(bids: impl IntoIterator<Item = &'a Bid>) -> Option<HighestBid> {
    bids.into_iter()
        .min_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id)))
        .map(|bid| HighestBid {
            price: bid.price,
            buyer_id: bid.buyer_id,
        })
}
