/// 경매 영업일 계산 (UTC+9 고정)
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// 영업 시간대 오프셋(초)
pub const BUSINESS_UTC_OFFSET_SECS: i32 = 9 * 3600;

pub fn business_zone() -> FixedOffset {
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// 현재 시각을 영업 시간대로 변환
pub fn to_business_time(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&business_zone())
}

/// 영업 시간대 기준 오늘 날짜
pub fn business_day(now: DateTime<Utc>) -> NaiveDate {
    to_business_time(now).date_naive()
}

/// 영업일 + 현지 시각을 UTC 시각으로 변환
pub fn business_instant(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = NaiveDateTime::new(day, time);
    // 고정 오프셋이라 항상 단일 결과
    business_zone()
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
