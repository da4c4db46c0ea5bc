//! 테넌트별/전역 복합 집계.
//!
//! 세션 식별자, 시퀀스 번호, 레코드/패키지/저장소 통계,
//! 지연 클래스별 분해를 하나로 묶는다. 엔진이 독점 소유하며
//! 롤업 경계에서 리셋·정리된다.

use actis_core::config::StatsConfig;
use actis_core::models::latency::LatencyClass;
use std::collections::BTreeMap;

use crate::latency_stats::LatencyStats;
use crate::package_stats::PackageStats;
use crate::record_stats::RecordStats;
use crate::storage_stats::OfflineStorageStats;

/// 스코프(테넌트 하나 또는 전역) 하나의 텔레메트리 집계
#[derive(Debug, Clone)]
pub struct TelemetryStats {
    /// 테넌트 ID — 토큰의 첫 `-` 이전 구간
    pub tenant_id: String,
    /// 엔진 세션 UUID (리셋 시 전파됨)
    pub session_id: String,
    /// 세션 시작 시각 (ms)
    pub session_start_ms: u64,
    /// 현재 통계 구간 시작 시각 (ms)
    pub stats_start_ms: u64,
    /// 프로세스 기동 시각 (ms) — 엔진 생성 시 한 번 기록
    pub session_startup_ms: u64,
    /// 통계 시퀀스 번호 — Ongoing 롤업마다 증가
    pub stats_sequence_num: u64,
    /// 오프라인 저장소 사용 여부
    pub offline_storage_enabled: bool,
    /// 패키지 통계
    pub package_stats: PackageStats,
    /// 패키지 왕복 시간 통계
    pub rtt_stats: LatencyStats,
    /// 레코드 통계
    pub record_stats: RecordStats,
    /// 지연 클래스별 레코드 통계
    pub record_stats_by_latency: BTreeMap<LatencyClass, RecordStats>,
    /// 지연 클래스별 기록→전송 지연 통계
    pub log_to_send_latency_by_latency: BTreeMap<LatencyClass, LatencyStats>,
    /// 재시도 횟수별 패키지 수 (희소 맵 — 재시도 횟수가 곧 키)
    pub retries_count_distribution: BTreeMap<u64, u64>,
    /// 오프라인 저장소 통계
    pub offline_storage_stats: OfflineStorageStats,
}

impl TelemetryStats {
    /// 버킷 키가 초기화된 행 생성.
    ///
    /// 전역 행은 엔진 생성 시, 테넌트 행은 첫 관측 시 이 경로로 만들어진다.
    pub fn with_keys(
        config: &StatsConfig,
        tenant_id: &str,
        session_id: &str,
        now_ms: u64,
        session_startup_ms: u64,
    ) -> Self {
        let mut stats = Self {
            tenant_id: tenant_id.to_string(),
            session_id: session_id.to_string(),
            session_start_ms: now_ms,
            stats_start_ms: now_ms,
            session_startup_ms,
            stats_sequence_num: 0,
            offline_storage_enabled: config.offline_storage_enabled,
            package_stats: PackageStats::default(),
            rtt_stats: LatencyStats::default(),
            record_stats: RecordStats::default(),
            record_stats_by_latency: BTreeMap::new(),
            log_to_send_latency_by_latency: BTreeMap::new(),
            retries_count_distribution: BTreeMap::new(),
            offline_storage_stats: OfflineStorageStats::default(),
        };
        stats.init_bucket_keys(config);
        stats
    }

    /// 설정 파라미터로 버킷 키 (재)초기화
    fn init_bucket_keys(&mut self, config: &StatsConfig) {
        self.rtt_stats.distribution.init_from(&config.rtt);
        for latency in self.log_to_send_latency_by_latency.values_mut() {
            latency.distribution.init_from(&config.log_to_send_latency);
        }
        self.record_stats
            .size_kib_distribution
            .init_from(&config.record_size_kib);
        if self.offline_storage_enabled {
            self.offline_storage_stats
                .save_size_kib
                .init_from(&config.storage_size_kib);
            self.offline_storage_stats
                .overwrite_size_kib
                .init_from(&config.storage_size_kib);
        }
    }

    /// 롤업 리셋.
    ///
    /// 카운터·히스토그램을 리셋하고 구간 시작 시각과 세션 ID를 갱신한다.
    /// start=true면 시퀀스 번호를 0으로 되돌리고 버킷 키를 재초기화,
    /// 아니면 시퀀스 번호를 올리고 키 집합은 유지한다.
    pub fn reset(&mut self, start: bool, config: &StatsConfig, session_id: &str, now_ms: u64) {
        self.package_stats.reset();
        self.rtt_stats.reset();
        self.log_to_send_latency_by_latency.clear();
        self.record_stats.reset();
        for per_class in self.record_stats_by_latency.values_mut() {
            per_class.reset();
        }
        self.offline_storage_stats.reset();
        self.retries_count_distribution.clear();

        self.stats_start_ms = now_ms;
        self.session_id = session_id.to_string();

        if start {
            self.stats_sequence_num = 0;
            self.session_start_ms = self.stats_start_ms;
            self.init_bucket_keys(config);
        } else {
            self.stats_sequence_num += 1;
        }
    }

    /// 세션 종료 정리 — 모든 맵과 히스토그램을 완전히 비운다
    pub fn clear_all(&mut self) {
        self.package_stats.reset();
        self.rtt_stats.reset();
        self.rtt_stats.distribution.clear();
        self.record_stats.reset();
        self.record_stats.clear_maps();
        self.record_stats_by_latency.clear();
        self.log_to_send_latency_by_latency.clear();
        self.retries_count_distribution.clear();
        self.offline_storage_stats.reset();
        self.offline_storage_stats.clear_maps();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StatsConfig {
        StatsConfig::default()
    }

    #[test]
    fn with_keys_initializes_distributions() {
        let stats = TelemetryStats::with_keys(&config(), "t1", "sess", 1_000, 1_000);

        assert!(!stats.rtt_stats.distribution.is_empty());
        assert!(!stats.record_stats.size_kib_distribution.is_empty());
        assert!(!stats.offline_storage_stats.save_size_kib.is_empty());
        assert_eq!(stats.stats_sequence_num, 0);
    }

    #[test]
    fn storage_keys_skipped_when_disabled() {
        let cfg = StatsConfig {
            offline_storage_enabled: false,
            ..StatsConfig::default()
        };
        let stats = TelemetryStats::with_keys(&cfg, "t1", "sess", 1_000, 1_000);
        assert!(stats.offline_storage_stats.save_size_kib.is_empty());
    }

    #[test]
    fn ongoing_reset_bumps_sequence_and_keeps_keys() {
        let cfg = config();
        let mut stats = TelemetryStats::with_keys(&cfg, "t1", "sess", 1_000, 1_000);
        stats.record_stats.received = 4;
        stats.record_stats.size_kib_distribution.observe(3);

        stats.reset(false, &cfg, "sess", 2_000);

        assert_eq!(stats.stats_sequence_num, 1);
        assert_eq!(stats.stats_start_ms, 2_000);
        assert_eq!(stats.session_start_ms, 1_000); // 세션 시작은 유지
        assert_eq!(stats.record_stats.received, 0);
        assert!(!stats.record_stats.size_kib_distribution.is_empty());
        assert_eq!(stats.record_stats.size_kib_distribution.total_count(), 0);
    }

    #[test]
    fn start_reset_rewinds_sequence() {
        let cfg = config();
        let mut stats = TelemetryStats::with_keys(&cfg, "t1", "sess", 1_000, 1_000);
        stats.reset(false, &cfg, "sess", 2_000);
        stats.reset(false, &cfg, "sess", 3_000);
        assert_eq!(stats.stats_sequence_num, 2);

        stats.reset(true, &cfg, "sess-2", 4_000);

        assert_eq!(stats.stats_sequence_num, 0);
        assert_eq!(stats.session_start_ms, 4_000);
        assert_eq!(stats.session_id, "sess-2");
    }

    #[test]
    fn clear_all_empties_every_map() {
        let cfg = config();
        let mut stats = TelemetryStats::with_keys(&cfg, "t1", "sess", 1_000, 1_000);
        stats.retries_count_distribution.insert(2, 1);
        stats
            .record_stats_by_latency
            .insert(LatencyClass::Normal, RecordStats::default());
        stats.package_stats.acked = 3;

        stats.clear_all();

        assert!(stats.rtt_stats.distribution.is_empty());
        assert!(stats.record_stats.size_kib_distribution.is_empty());
        assert!(stats.record_stats_by_latency.is_empty());
        assert!(stats.retries_count_distribution.is_empty());
        assert_eq!(stats.package_stats.acked, 0);
    }
}
