//! 통계 엔진 런타임 설정.
//!
//! 메타 통계 전용 테넌트 토큰, 전송 주기, 오프라인 저장소 플래그,
//! 그리고 네 종류의 히스토그램 버킷 파라미터를 정의한다.
//! 모든 분포 파라미터는 기하(factor) 방식이다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 분포(히스토그램) 버킷 파라미터.
///
/// 버킷 키는 0에서 시작해 `first_value`, `first_value * factor`, ... 순으로
/// `total_spots`개(0 포함)까지 생성된다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributionParams {
    /// 0 다음의 첫 버킷 하한값
    pub first_value: u64,
    /// 다음 버킷 하한 = 이전 하한 × factor
    pub factor: u64,
    /// 전체 버킷 수 (키 0 포함)
    pub total_spots: u32,
}

impl DistributionParams {
    /// 파라미터 유효성 검증.
    ///
    /// factor < 2 이면 기하 수열이 퇴화해 키가 증가하지 않으므로 거부한다.
    fn validate(&self, field: &str) -> Result<(), CoreError> {
        if self.total_spots == 0 {
            return Err(CoreError::Validation {
                field: field.to_string(),
                message: "total_spots는 1 이상이어야 한다".to_string(),
            });
        }
        if self.total_spots > 1 && (self.factor < 2 || self.first_value == 0) {
            return Err(CoreError::Validation {
                field: field.to_string(),
                message: format!(
                    "기하 분포 파라미터 퇴화 (first_value={}, factor={})",
                    self.first_value, self.factor
                ),
            });
        }
        Ok(())
    }
}

/// 메타 통계 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// 메타 통계 레코드가 귀속되는 테넌트 토큰 (`tenantId-ingestionKey` 형식).
    /// 자기 제외(self-exclusion) 판정과 통계 레코드의 iKey 계산에 쓰인다.
    #[serde(default = "default_meta_stats_tenant_token")]
    pub meta_stats_tenant_token: String,
    /// 메타 통계 전송 주기 (초) — 레코드의 `st_freq` 필드로 보고된다
    #[serde(default = "default_send_interval_secs")]
    pub meta_stats_send_interval_secs: u32,
    /// 오프라인 저장소 사용 여부 — 저장소 크기 히스토그램 초기화를 제어
    #[serde(default = "default_true")]
    pub offline_storage_enabled: bool,
    /// 패키지 왕복 시간(RTT) 분포 파라미터 (밀리초)
    #[serde(default = "default_rtt_params")]
    pub rtt: DistributionParams,
    /// 기록→전송 완료 지연 분포 파라미터 (밀리초)
    #[serde(default = "default_latency_params")]
    pub log_to_send_latency: DistributionParams,
    /// 레코드 크기 분포 파라미터 (KiB)
    #[serde(default = "default_record_size_params")]
    pub record_size_kib: DistributionParams,
    /// 저장소 쓰기 크기 분포 파라미터 (KiB)
    #[serde(default = "default_storage_size_params")]
    pub storage_size_kib: DistributionParams,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            meta_stats_tenant_token: default_meta_stats_tenant_token(),
            meta_stats_send_interval_secs: default_send_interval_secs(),
            offline_storage_enabled: true,
            rtt: default_rtt_params(),
            log_to_send_latency: default_latency_params(),
            record_size_kib: default_record_size_params(),
            storage_size_kib: default_storage_size_params(),
        }
    }
}

impl StatsConfig {
    /// 전체 분포 파라미터 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.meta_stats_tenant_token.is_empty() {
            return Err(CoreError::Config(
                "meta_stats_tenant_token이 비어 있음".to_string(),
            ));
        }
        self.rtt.validate("rtt")?;
        self.log_to_send_latency.validate("log_to_send_latency")?;
        self.record_size_kib.validate("record_size_kib")?;
        self.storage_size_kib.validate("storage_size_kib")?;
        Ok(())
    }

    /// 전송 주기를 Duration으로 반환
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.meta_stats_send_interval_secs))
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_meta_stats_tenant_token() -> String {
    "actisstats-default".to_string()
}

fn default_send_interval_secs() -> u32 {
    1_800 // 30분
}

fn default_rtt_params() -> DistributionParams {
    DistributionParams {
        first_value: 100,
        factor: 2,
        total_spots: 8,
    }
}

fn default_latency_params() -> DistributionParams {
    DistributionParams {
        first_value: 200,
        factor: 2,
        total_spots: 8,
    }
}

fn default_record_size_params() -> DistributionParams {
    DistributionParams {
        first_value: 1,
        factor: 2,
        total_spots: 8,
    }
}

fn default_storage_size_params() -> DistributionParams {
    DistributionParams {
        first_value: 8,
        factor: 2,
        total_spots: 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_factor_rejected() {
        let mut config = StatsConfig::default();
        config.rtt.factor = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_spots_rejected() {
        let mut config = StatsConfig::default();
        config.record_size_kib.total_spots = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_token_rejected() {
        let config = StatsConfig {
            meta_stats_tenant_token: String::new(),
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_json_roundtrip() {
        // 부분 설정 파일에서도 기본값이 채워져야 함
        let config: StatsConfig =
            serde_json::from_str(r#"{"meta_stats_tenant_token":"tok-abc"}"#).unwrap();
        assert_eq!(config.meta_stats_tenant_token, "tok-abc");
        assert_eq!(config.meta_stats_send_interval_secs, 1_800);
        assert_eq!(config.send_interval().as_secs(), 1_800);
    }
}
