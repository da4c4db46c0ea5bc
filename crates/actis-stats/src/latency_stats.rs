//! 지연 통계 — 최소/최대 스칼라 + 분포.

use actis_core::config::DistributionParams;

use crate::distribution::Distribution;

/// 지연 통계 (밀리초)
#[derive(Debug, Clone)]
pub struct LatencyStats {
    /// 관측된 최소 지연 — 관측 전에는 `u64::MAX`
    pub min_ms: u64,
    /// 관측된 최대 지연
    pub max_ms: u64,
    /// 지연 분포
    pub distribution: Distribution,
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self {
            min_ms: u64::MAX,
            max_ms: 0,
            distribution: Distribution::new(),
        }
    }
}

impl LatencyStats {
    /// 버킷 키가 초기화된 상태로 생성 — 지연 클래스별 엔트리의 지연 생성용
    pub fn with_keys(params: &DistributionParams) -> Self {
        let mut stats = Self::default();
        stats.distribution.init_from(params);
        stats
    }

    /// 지연 관측 — min/max 갱신 + 분포 집계
    pub fn observe(&mut self, duration_ms: u64) {
        self.min_ms = self.min_ms.min(duration_ms);
        self.max_ms = self.max_ms.max(duration_ms);
        self.distribution.observe(duration_ms);
    }

    /// 스칼라를 초기값으로, 분포 값을 0으로 — 버킷 키는 유지
    pub fn reset(&mut self) {
        self.min_ms = u64::MAX;
        self.max_ms = 0;
        self.distribution.reset_values();
    }
}
