/// 요청 주체 식별
/// 로그인/세션 관리는 앞단 인증 게이트웨이가 맡고, 확인된 ID를 헤더로 넘겨준다.
use crate::error::Error;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const BUYER_ID_HEADER: &str = "x-buyer-id";
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// 인증된 구매자
#[derive(Debug, Clone, Copy)]
pub struct BuyerSession {
    pub buyer_id: i64,
}

/// 인증된 관리자
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub admin_id: i64,
}

fn header_id(parts: &Parts, header: &str) -> Option<i64> {
    parts
        .headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BuyerSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_id(parts, BUYER_ID_HEADER)
            .map(|buyer_id| Self { buyer_id })
            .ok_or_else(|| Error::Unauthorized("구매자 세션이 없습니다.".to_string()))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_id(parts, ADMIN_ID_HEADER)
            .map(|admin_id| Self { admin_id })
            .ok_or_else(|| Error::Unauthorized("관리자 세션이 없습니다.".to_string()))
    }
}
