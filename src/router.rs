use crate::handlers::{self, AppState};
use crate::store::Store;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// 라우터 설정
pub fn routes<S: Store>(state: AppState<S>) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::handle_health))
        // 구매자
        .route("/api/buyer/bids", post(handlers::handle_bid::<S>))
        // 조회
        .route("/api/venues", get(handlers::handle_get_venues::<S>))
        .route("/api/venues/:id", get(handlers::handle_get_venue::<S>))
        .route("/api/auctions", get(handlers::handle_get_auctions::<S>))
        .route("/api/auctions/:id", get(handlers::handle_get_auction::<S>))
        .route(
            "/api/auctions/:id/items",
            get(handlers::handle_get_auction_items::<S>),
        )
        .route(
            "/api/auctions/:id/status",
            patch(handlers::handle_update_auction_status::<S>),
        )
        .route("/api/items/:id", get(handlers::handle_get_item::<S>))
        .route("/api/items/:id/bids", get(handlers::handle_get_item_bids::<S>))
        .route(
            "/api/items/:id/highest-bid",
            get(handlers::handle_get_highest_bid::<S>),
        )
        .route("/api/invoices", get(handlers::handle_get_invoices::<S>))
        .route("/api/buyers/:id", get(handlers::handle_get_buyer::<S>))
        .route(
            "/api/fishermen/:id",
            get(handlers::handle_get_fisherman::<S>),
        )
        // 관리자
        .route("/api/admin/venues", post(handlers::handle_create_venue::<S>))
        .route(
            "/api/admin/venues/:id",
            delete(handlers::handle_delete_venue::<S>),
        )
        .route(
            "/api/admin/auctions",
            post(handlers::handle_create_auction::<S>),
        )
        .route(
            "/api/admin/auctions/:id",
            delete(handlers::handle_delete_auction::<S>),
        )
        .route("/api/admin/items", post(handlers::handle_create_item::<S>))
        .route(
            "/api/admin/items/:id/status",
            patch(handlers::handle_update_item_status::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
