//! 타임스탬프 역직렬화 헬퍼.
//!
//! 백엔드는 존(zone) 없는 로컬 일시(`2026-02-12T10:00:00`)를 보내기도 하고
//! RFC 3339(`2026-02-12T10:00:00Z`)를 보내기도 한다. 존이 없으면 UTC로 간주한다.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// 문자열 타임스탬프 파싱 (RFC 3339 → 실패 시 naive 로컬 일시)
pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("잘못된 타임스탬프 '{raw}': {e}"))
}

/// 필수 타임스탬프 필드용
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// 선택 타임스탬프 필드용 (`#[serde(default)]`와 함께 사용)
pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
