use crate::error::Error;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// region:    --- Status

/// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "auction_status", rename_all = "snake_case")]
pub enum AuctionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AuctionStatus {
    /// 종료 상태(Completed, Cancelled)에서는 더 이상 전이하지 않는다
    pub fn is_terminal(self) -> bool {
        matches!(self, AuctionStatus::Completed | AuctionStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuctionStatus::Scheduled => "scheduled",
            AuctionStatus::InProgress => "in_progress",
            AuctionStatus::Completed => "completed",
            AuctionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AuctionStatus::Scheduled),
            "in_progress" => Ok(AuctionStatus::InProgress),
            "completed" => Ok(AuctionStatus::Completed),
            "cancelled" => Ok(AuctionStatus::Cancelled),
            other => Err(Error::Validation(format!(
                "알 수 없는 경매 상태입니다: {}",
                other
            ))),
        }
    }
}

/// 경매 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "item_status", rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Available,
    Sold,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Available => "available",
            ItemStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ItemStatus::Pending),
            "available" => Ok(ItemStatus::Available),
            "sold" => Ok(ItemStatus::Sold),
            other => Err(Error::Validation(format!(
                "알 수 없는 상품 상태입니다: {}",
                other
            ))),
        }
    }
}

// endregion: --- Status

// region:    --- Entities

/// 경매장
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 경매 회차
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub venue_id: i64,
    pub auction_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 경매 상품 (최고 입찰 정보는 포함하지 않음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuctionItem {
    pub id: i64,
    pub auction_id: i64,
    pub fisherman_id: i64,
    pub fish_type: String,
    pub quantity: i32,
    pub unit: String,
    pub status: ItemStatus,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// 어민
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fisherman {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// 구매자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Buyer {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// endregion: --- Entities

// region:    --- Inputs

#[derive(Debug, Clone, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuction {
    pub venue_id: i64,
    pub auction_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<AuctionStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub auction_id: i64,
    pub fisherman_id: i64,
    pub fish_type: String,
    pub quantity: i32,
    pub unit: String,
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub sort_order: i32,
}

// endregion: --- Inputs
