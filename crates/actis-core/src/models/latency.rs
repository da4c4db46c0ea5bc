//! 우선순위(지연 클래스)와 롤업 종류.
//!
//! 파이프라인이 이벤트에 부여하는 4단계 우선순위와,
//! 메타 통계 스냅샷을 트리거하는 롤업 경계를 정의한다.
//! "클래스 없음"은 뮤테이터 시그니처에서 `Option<LatencyClass>`의 `None`으로 표현한다.

use serde::{Deserialize, Serialize};

/// 이벤트 지연 클래스 — 4단계 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LatencyClass {
    /// 일반 (배치 전송)
    Normal,
    /// 비용 절감 우선 (전송 유예 가능)
    CostDeferred,
    /// 실시간
    RealTime,
    /// 최고 우선 (즉시 전송)
    Max,
}

impl LatencyClass {
    /// 통계 레코드에서 클래스별 블록에 붙는 키 접두사
    pub fn field_prefix(self) -> &'static str {
        match self {
            LatencyClass::Normal => "ln",
            LatencyClass::CostDeferred => "ld",
            LatencyClass::RealTime => "lr",
            LatencyClass::Max => "lm",
        }
    }

    /// 전체 클래스 (스냅샷 순회용, 우선순위 오름차순)
    pub const ALL: [LatencyClass; 4] = [
        LatencyClass::Normal,
        LatencyClass::CostDeferred,
        LatencyClass::RealTime,
        LatencyClass::Max,
    ];
}

/// 롤업 종류 — 스냅샷·리셋 경계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollupKind {
    /// 세션 시작 — 버킷 키 초기화 포함
    Start,
    /// 주기 롤업 — 자기 제외 조건으로 게이트됨
    Ongoing,
    /// 세션 종료 — 전체 맵/히스토그램 비움
    Stop,
}

impl RollupKind {
    /// 레코드의 `stats_rollup_kind` 값
    pub fn as_label(self) -> &'static str {
        match self {
            RollupKind::Start => "start",
            RollupKind::Stop => "stop",
            RollupKind::Ongoing => "ongoing",
        }
    }
}
