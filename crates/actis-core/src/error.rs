//! ACTIS 핵심 에러 타입.
//!
//! 메타 통계 엔진 자체는 복구 가능한 실패 모드가 없다 — 모든 뮤테이터는
//! 전체 함수(total function)이며 호출자에게 에러를 올리지 않는다.
//! 여기서 정의하는 에러는 엔진 생성 시점의 설정 검증과 직렬화 경계에만 쓰인다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },
}
