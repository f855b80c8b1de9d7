use chrono::{Duration, NaiveTime, Utc};
use fish_auction_service::cache::MemoryCache;
use fish_auction_service::clock;
use fish_auction_service::handlers::AppState;
use fish_auction_service::router;
use fish_auction_service::session::{ADMIN_ID_HEADER, BUYER_ID_HEADER};
use fish_auction_service::store::{MemoryStore, PartyRepository};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

const ADMIN: (&str, &str) = (ADMIN_ID_HEADER, "1");

/// 테스트 서버 주소와 클라이언트
struct TestApp {
    base_url: String,
    client: Client,
}

/// 프로세스 내 저장소로 서버를 임의 포트에 띄운다
async fn setup() -> (TestApp, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Arc::clone(&store),
        Arc::new(MemoryCache::new()),
        std::time::Duration::from_secs(60),
    );
    let routes_all = router::routes(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, routes_all.into_make_service())
            .await
            .expect("Test server error");
    });

    let app = TestApp {
        base_url: format!("http://{}", addr),
        client: Client::new(),
    };
    (app, store)
}

/// 요청 전송 후 (상태 코드, JSON 본문) 반환
async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = app
        .client
        .request(method, format!("{}{}", app.base_url, uri));
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    if let Some(json) = body {
        request = request.json(&json);
    }

    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, value)
}

/// 경매장 + 진행 중 경매 생성. 경매는 영업일 기준 오늘, 종료는 약 1시간 뒤.
async fn create_open_auction(app: &TestApp) -> (i64, i64) {
    let (status, venue) = send(
        app,
        Method::POST,
        "/api/admin/venues",
        &[ADMIN],
        Some(json!({"name": "부산공동어시장", "location": "부산 서구"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let local = clock::to_business_time(Utc::now());
    let late = NaiveTime::from_hms_opt(22, 30, 0).unwrap();
    let (auction_date, end_time) = if local.time() < late {
        (local.date_naive(), local.time() + Duration::hours(1))
    } else {
        (
            local.date_naive() + Duration::days(1),
            NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
        )
    };

    let (status, auction) = send(
        app,
        Method::POST,
        "/api/admin/auctions",
        &[ADMIN],
        Some(json!({
            "venue_id": venue["id"],
            "auction_date": auction_date,
            "end_time": end_time,
            "status": "in_progress",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", auction);
    (venue["id"].as_i64().unwrap(), auction["id"].as_i64().unwrap())
}

async fn create_item(app: &TestApp, auction_id: i64, fisherman_id: i64, fish: &str) -> i64 {
    let (status, item) = send(
        app,
        Method::POST,
        "/api/admin/items",
        &[ADMIN],
        Some(json!({
            "auction_id": auction_id,
            "fisherman_id": fisherman_id,
            "fish_type": fish,
            "quantity": 20,
            "unit": "kg",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", item);
    assert_eq!(item["status"], "pending");
    item["id"].as_i64().unwrap()
}

async fn place_bid(app: &TestApp, buyer_id: i64, item_id: i64, price: i64) -> (StatusCode, Value) {
    let buyer = buyer_id.to_string();
    send(
        app,
        Method::POST,
        "/api/buyer/bids",
        &[(BUYER_ID_HEADER, buyer.as_str())],
        Some(json!({"item_id": item_id, "price": price})),
    )
    .await
}

/// 경매 전체 흐름: 등록 → 입찰 → 낙찰 → 최고가 유지
#[tokio::test]
async fn test_auction_end_to_end() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("김선장", Utc::now()).await.unwrap();
    let first_buyer = store.create_buyer("동해수산", Utc::now()).await.unwrap();
    let second_buyer = store.create_buyer("남해상회", Utc::now()).await.unwrap();

    let (_, auction_id) = create_open_auction(&app).await;
    let item_id = create_item(&app, auction_id, fisherman.id, "참돔").await;

    let (status, bid) = place_bid(&app, first_buyer.id, item_id, 5000).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bid["item_id"], item_id);
    assert_eq!(bid["buyer_id"], first_buyer.id);
    assert_eq!(bid["price"], 5000);
    assert!(bid["created_at"].is_string());

    let (_, item) = send(&app, Method::GET, &format!("/api/items/{}", item_id), &[], None).await;
    assert_eq!(item["status"], "sold");

    let items_uri = format!("/api/auctions/{}/items", auction_id);
    let (_, items) = send(&app, Method::GET, &items_uri, &[], None).await;
    assert_eq!(items[0]["highest_bid"], 5000);

    // 이미 낙찰된 상품에 낮은 금액 입찰: 기록은 되지만 최고가는 그대로
    let (status, _) = place_bid(&app, second_buyer.id, item_id, 4000).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, items) = send(&app, Method::GET, &items_uri, &[], None).await;
    assert_eq!(items[0]["highest_bid"], 5000);
    assert_eq!(items[0]["highest_bidder_id"], first_buyer.id);

    let (_, bids) = send(&app, Method::GET, &format!("/api/items/{}/bids", item_id), &[], None).await;
    assert_eq!(bids.as_array().unwrap().len(), 2);

    let (_, auction) = send(&app, Method::GET, &format!("/api/auctions/{}", auction_id), &[], None).await;
    assert_eq!(auction["status"], "in_progress");
}

/// 입찰이 없는 상품은 highest_bid가 null
#[tokio::test]
async fn test_item_without_bids_has_null_highest_bid() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("이어부", Utc::now()).await.unwrap();
    let (_, auction_id) = create_open_auction(&app).await;
    let item_id = create_item(&app, auction_id, fisherman.id, "전복").await;

    let (status, items) = send(
        &app,
        Method::GET,
        &format!("/api/auctions/{}/items", auction_id),
        &[],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items[0]["id"], item_id);
    assert!(items[0]["highest_bid"].is_null());

    let (_, highest) = send(
        &app,
        Method::GET,
        &format!("/api/items/{}/highest-bid", item_id),
        &[],
        None,
    )
    .await;
    assert!(highest["highest_bid"].is_null());
}

/// 인증/검증 실패
#[tokio::test]
async fn test_bid_rejections() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("정어부", Utc::now()).await.unwrap();
    let buyer = store.create_buyer("서해상사", Utc::now()).await.unwrap();
    let (_, auction_id) = create_open_auction(&app).await;
    let item_id = create_item(&app, auction_id, fisherman.id, "광어").await;

    // 세션 없음
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/buyer/bids",
        &[],
        Some(json!({"item_id": item_id, "price": 1000})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // 존재하지 않는 구매자
    let (status, _) = place_bid(&app, 999_999, item_id, 1000).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 금액 검증
    let (status, body) = place_bid(&app, buyer.id, item_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    // 없는 상품
    let (status, _) = place_bid(&app, buyer.id, 987_654, 1000).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 실패한 요청은 상품 상태를 바꾸지 않는다
    let (_, item) = send(&app, Method::GET, &format!("/api/items/{}", item_id), &[], None).await;
    assert_eq!(item["status"], "pending");
}

/// 경매 상태 변경
#[tokio::test]
async fn test_update_auction_status() {
    let (app, _) = setup().await;
    let (_, auction_id) = create_open_auction(&app).await;
    let uri = format!("/api/auctions/{}/status", auction_id);

    let (status, _) = send(&app, Method::PATCH, &uri, &[], Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::PATCH, &uri, &[ADMIN], Some(json!({"status": "DONE"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, body) = send(&app, Method::PATCH, &uri, &[ADMIN], Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = send(&app, Method::PATCH, &uri, &[ADMIN], Some(json!({"status": "in_progress"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

/// 본문 형식 오류는 공통 에러 형식의 400
#[tokio::test]
async fn test_malformed_bodies_are_validation_errors() {
    let (app, store) = setup().await;
    let buyer = store.create_buyer("속초수산", Utc::now()).await.unwrap();
    let (_, auction_id) = create_open_auction(&app).await;
    let buyer_header = buyer.id.to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/buyer/bids",
        &[(BUYER_ID_HEADER, buyer_header.as_str())],
        Some(json!({"item_id": "abc", "price": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/auctions/{}/status", auction_id),
        &[ADMIN],
        Some(json!({"state": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (_, auction) = send(&app, Method::GET, &format!("/api/auctions/{}", auction_id), &[], None).await;
    assert_eq!(auction["status"], "in_progress");
}

/// 청구서: 구매자별 합계 + 세금 8% (소수점 버림)
#[tokio::test]
async fn test_invoices() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("한어부", Utc::now()).await.unwrap();
    let buyer_a = store.create_buyer("A수산", Utc::now()).await.unwrap();
    let buyer_b = store.create_buyer("B수산", Utc::now()).await.unwrap();
    let (_, auction_id) = create_open_auction(&app).await;
    let first = create_item(&app, auction_id, fisherman.id, "우럭").await;
    let second = create_item(&app, auction_id, fisherman.id, "농어").await;

    place_bid(&app, buyer_a.id, first, 600).await;
    place_bid(&app, buyer_a.id, second, 400).await;
    place_bid(&app, buyer_b.id, first, 999).await;

    let (status, invoices) = send(&app, Method::GET, "/api/invoices", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let invoices = invoices.as_array().unwrap();
    assert_eq!(invoices.len(), 2);

    let line_a = invoices.iter().find(|l| l["buyer_id"] == buyer_a.id).unwrap();
    assert_eq!(line_a["buyer_name"], "A수산");
    assert_eq!(line_a["total_amount"], 1080);

    let line_b = invoices.iter().find(|l| l["buyer_id"] == buyer_b.id).unwrap();
    assert_eq!(line_b["total_amount"], 1078);

    // 새 입찰 후 다시 집계하면 반영된다
    place_bid(&app, buyer_b.id, second, 1).await;
    let (_, invoices) = send(&app, Method::GET, "/api/invoices", &[], None).await;
    let line_b = invoices
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["buyer_id"] == buyer_b.id)
        .unwrap()
        .clone();
    assert_eq!(line_b["total_amount"], 1080);
}

/// 입찰 기록이 있는 경매장/경매는 삭제할 수 없다
#[tokio::test]
async fn test_cascade_delete_guard() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("오어부", Utc::now()).await.unwrap();
    let buyer = store.create_buyer("제주상회", Utc::now()).await.unwrap();
    let (venue_id, auction_id) = create_open_auction(&app).await;
    let item_id = create_item(&app, auction_id, fisherman.id, "옥돔").await;
    place_bid(&app, buyer.id, item_id, 3000).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/venues/{}", venue_id),
        &[ADMIN],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/auctions/{}", auction_id),
        &[ADMIN],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 모든 데이터가 그대로 남아 있다
    let (status, _) = send(&app, Method::GET, &format!("/api/venues/{}", venue_id), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/auctions/{}", auction_id), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, bids) = send(&app, Method::GET, &format!("/api/items/{}/bids", item_id), &[], None).await;
    assert_eq!(bids.as_array().unwrap().len(), 1);
}

/// 입찰이 없으면 삭제 가능. 경매장은 논리 삭제 후 조회되지 않는다.
#[tokio::test]
async fn test_delete_without_bids() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("조어부", Utc::now()).await.unwrap();
    let (venue_id, auction_id) = create_open_auction(&app).await;
    let item_id = create_item(&app, auction_id, fisherman.id, "삼치").await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/auctions/{}", auction_id),
        &[ADMIN],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/items/{}", item_id), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/venues/{}", venue_id),
        &[ADMIN],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/venues/{}", venue_id), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, venues) = send(&app, Method::GET, "/api/venues", &[], None).await;
    assert!(venues.as_array().unwrap().is_empty());
}

/// 구매자/어민 조회
#[tokio::test]
async fn test_party_lookups() {
    let (app, store) = setup().await;
    let fisherman = store.create_fisherman("윤선장", Utc::now()).await.unwrap();
    let buyer = store.create_buyer("강릉수산", Utc::now()).await.unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/fishermen/{}", fisherman.id), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "윤선장");

    let (status, body) = send(&app, Method::GET, &format!("/api/buyers/{}", buyer.id), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "강릉수산");

    let (status, body) = send(&app, Method::GET, "/api/buyers/424242", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
}
