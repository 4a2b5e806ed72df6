//! 그룹 동기화 도메인 모델.
//!
//! 백엔드와 주고받는 동기화 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현하며 camelCase JSON을 사용한다.

pub mod sync;
pub mod timestamp;
