//! # actis-core
//!
//! ACTIS 텔레메트리 SDK의 도메인 모델, 설정, 에러 타입.
//! 파이프라인 각 단계(수집, 배치, 전송, 저장)와 메타 통계 엔진이
//! 공유하는 핵심 타입을 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 레코드 스키마, 우선순위/롤업/사유 enum (serde Serialize/Deserialize)
//! - [`config`] — 통계 엔진 런타임 설정 (분포 파라미터 포함)
//! - [`error`] — 핵심 에러 타입 (thiserror)

pub mod config;
pub mod error;
pub mod models;

#[cfg(test)]
mod tests {
    use crate::config::StatsConfig;
    use crate::models::latency::{LatencyClass, RollupKind};
    use crate::models::tenant::tenant_id_of;

    #[test]
    fn config_defaults() {
        let config = StatsConfig::default();
        assert_eq!(config.meta_stats_send_interval_secs, 1_800);
        assert!(config.offline_storage_enabled);
        assert_eq!(config.rtt.total_spots, 8);
        assert_eq!(config.record_size_kib.first_value, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rollup_kind_labels() {
        assert_eq!(RollupKind::Start.as_label(), "start");
        assert_eq!(RollupKind::Stop.as_label(), "stop");
        assert_eq!(RollupKind::Ongoing.as_label(), "ongoing");
    }

    #[test]
    fn latency_class_ordering() {
        assert!(LatencyClass::Max > LatencyClass::RealTime);
        assert!(LatencyClass::RealTime > LatencyClass::CostDeferred);
        assert!(LatencyClass::CostDeferred > LatencyClass::Normal);
    }

    #[test]
    fn tenant_prefix_extraction() {
        assert_eq!(tenant_id_of("abc-def-ghi"), "abc");
        // 구분자가 없으면 토큰 전체가 테넌트 ID
        assert_eq!(tenant_id_of("abcdef"), "abcdef");
        assert_eq!(tenant_id_of(""), "");
    }
}
