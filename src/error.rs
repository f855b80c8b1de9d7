/// 서비스 공통 에러 분류
/// 모든 에러는 ErrorKind 하나로 분류되고, HTTP 상태 코드 매핑은 이 파일에서만 한다.
// region:    --- Imports
use crate::config::ConfigError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Error
#[derive(Error, Debug)]
pub enum Error {
    /// 입력 형식/범위 오류
    #[error("잘못된 요청입니다: {0}")]
    Validation(String),
    /// ID로 찾을 수 없는 데이터
    #[error("{0}을(를) 찾을 수 없습니다.")]
    NotFound(String),
    /// 상태 충돌 또는 참조 무결성 위반
    #[error("요청이 현재 상태와 충돌합니다: {0}")]
    Conflict(String),
    /// 인증 실패
    #[error("인증이 필요합니다: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("내부 오류: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// 에러 종류 구분자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Database(_) | Error::Config(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// RowNotFound는 NotFound, 외래 키 위반은 Conflict로 변환
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return Error::Conflict(db_err.message().to_string());
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return Error::NotFound("요청한 데이터".to_string());
        }
        Error::Database(err)
    }
}

/// 본문 형식/타입 오류는 400으로
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}
// endregion: --- Error

// region:    --- Response
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = match kind {
            ErrorKind::Internal => {
                error!("{:<12} --> 내부 오류: {}", "Error", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (
            kind.status_code(),
            Json(serde_json::json!({
                "error": message,
                "code": kind.code(),
            })),
        )
            .into_response()
    }
}
// endregion: --- Response
