// region:    --- Venues

/// 경매장 생성
pub const INSERT_VENUE: &str = r#"
    INSERT INTO venues (name, location, description, created_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, name, location, description, created_at, deleted_at
"#;

/// 경매장 조회 (논리 삭제 제외)
pub const GET_VENUE: &str = "SELECT id, name, location, description, created_at, deleted_at FROM venues WHERE id = $1 AND deleted_at IS NULL";

/// 경매장 목록
pub const GET_ALL_VENUES: &str = "SELECT id, name, location, description, created_at, deleted_at FROM venues WHERE deleted_at IS NULL ORDER BY id";

/// 삭제 대상 경매장 잠금
pub const LOCK_VENUE: &str =
    "SELECT id FROM venues WHERE id = $1 AND deleted_at IS NULL FOR UPDATE";

/// 경매장 하위 상품의 입찰 존재 여부
pub const VENUE_HAS_BIDS: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM bids b
        JOIN auction_items i ON i.id = b.item_id
        JOIN auctions a ON a.id = i.auction_id
        WHERE a.venue_id = $1
    )
"#;

/// 경매장 논리 삭제
pub const SOFT_DELETE_VENUE: &str = "UPDATE venues SET deleted_at = $2 WHERE id = $1";

// endregion: --- Venues

// region:    --- Auctions

/// 경매 생성
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (venue_id, auction_date, start_time, end_time, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $6)
    RETURNING id, venue_id, auction_date, start_time, end_time, status, created_at, updated_at
"#;

/// 경매 조회
pub const GET_AUCTION: &str = "SELECT id, venue_id, auction_date, start_time, end_time, status, created_at, updated_at FROM auctions WHERE id = $1";

/// 경매 목록
pub const GET_ALL_AUCTIONS: &str = "SELECT id, venue_id, auction_date, start_time, end_time, status, created_at, updated_at FROM auctions ORDER BY auction_date DESC, id DESC";

/// 진행 중이거나 예정된 경매 목록
pub const GET_OPEN_AUCTIONS: &str = r#"
    SELECT id, venue_id, auction_date, start_time, end_time, status, created_at, updated_at
    FROM auctions
    WHERE status NOT IN ('completed', 'cancelled')
    ORDER BY id
"#;

/// 경매 상태 변경
pub const UPDATE_AUCTION_STATUS: &str = r#"
    UPDATE auctions SET status = $2, updated_at = $3
    WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
    RETURNING id, venue_id, auction_date, start_time, end_time, status, created_at, updated_at
"#;

/// 경매 완료 처리 (종료 상태는 건드리지 않음)
pub const COMPLETE_AUCTION: &str = r#"
    UPDATE auctions SET status = 'completed', updated_at = $2
    WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
"#;

/// 경매 삭제 (상품은 ON DELETE CASCADE, 입찰은 RESTRICT)
pub const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1";

// endregion: --- Auctions

// region:    --- Items

/// 상품 생성
pub const INSERT_ITEM: &str = r#"
    INSERT INTO auction_items (auction_id, fisherman_id, fish_type, quantity, unit, status, sort_order, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING id, auction_id, fisherman_id, fish_type, quantity, unit, status, sort_order, created_at
"#;

/// 상품 조회
pub const GET_ITEM: &str = "SELECT id, auction_id, fisherman_id, fish_type, quantity, unit, status, sort_order, created_at FROM auction_items WHERE id = $1";

/// 경매별 상품 + 최고 입찰가
pub const GET_ITEM_LISTINGS: &str = r#"
    SELECT i.id, i.auction_id, i.fisherman_id, i.fish_type, i.quantity, i.unit, i.status,
           i.sort_order, i.created_at,
           hb.price AS highest_bid, hb.buyer_id AS highest_bidder_id
    FROM auction_items i
    LEFT JOIN LATERAL (
        SELECT b.price, b.buyer_id
        FROM bids b
        WHERE b.item_id = i.id
        ORDER BY b.price DESC, b.id ASC
        LIMIT 1
    ) hb ON TRUE
    WHERE i.auction_id = $1
    ORDER BY i.sort_order, i.id
"#;

/// 상품 상태 변경
pub const UPDATE_ITEM_STATUS: &str = r#"
    UPDATE auction_items SET status = $2
    WHERE id = $1 AND (status <> 'sold' OR $2 = 'sold'::item_status)
    RETURNING id, auction_id, fisherman_id, fish_type, quantity, unit, status, sort_order, created_at
"#;

/// 낙찰 처리용 상태 변경 (현재 상태와 무관)
pub const SET_ITEM_STATUS: &str = r#"
    UPDATE auction_items SET status = $2
    WHERE id = $1
"#;

// endregion: --- Items

// region:    --- Bids

/// 입찰 기록 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (item_id, buyer_id, price, created_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, item_id, buyer_id, price, created_at
"#;

/// 상품 입찰 이력
pub const GET_ITEM_BIDS: &str = r#"
    SELECT id, item_id, buyer_id, price, created_at
    FROM bids
    WHERE item_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// 최고 입찰 조회
pub const GET_HIGHEST_BID: &str = r#"
    SELECT price, buyer_id
    FROM bids
    WHERE item_id = $1
    ORDER BY price DESC, id ASC
    LIMIT 1
"#;

/// 구매자별 낙찰 합계
pub const GET_BUYER_TOTALS: &str = r#"
    SELECT b.buyer_id, u.name AS buyer_name, SUM(b.price)::BIGINT AS total_price
    FROM bids b
    JOIN buyers u ON u.id = b.buyer_id
    GROUP BY b.buyer_id, u.name
    ORDER BY b.buyer_id
"#;

// endregion: --- Bids

// region:    --- Parties

pub const INSERT_BUYER: &str =
    "INSERT INTO buyers (name, created_at) VALUES ($1, $2) RETURNING id, name, created_at";

pub const GET_BUYER: &str = "SELECT id, name, created_at FROM buyers WHERE id = $1";

pub const INSERT_FISHERMAN: &str =
    "INSERT INTO fishermen (name, created_at) VALUES ($1, $2) RETURNING id, name, created_at";

pub const GET_FISHERMAN: &str = "SELECT id, name, created_at FROM fishermen WHERE id = $1";

// endregion: --- Parties
