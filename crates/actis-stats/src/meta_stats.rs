//! 메타 통계 엔진.
//!
//! 파이프라인 각 단계(수집, 전송, 저장)가 호출하는 뮤테이터의 집합과,
//! 롤업 경계에서 스냅샷 레코드를 생산하는 상태 기계.
//!
//! 엔진 상태 전체가 단일 임계 구역이다 — 모든 뮤테이터와 리더는
//! 하나의 락으로 직렬화되고, 락 안에서는 I/O를 하지 않는다.
//! 생산된 레코드는 락 해제 후 호출자에게 반환되며, 파이프라인에
//! 흘려보내는 것은 호출자의 몫이다.

use actis_core::config::StatsConfig;
use actis_core::error::CoreError;
use actis_core::models::latency::{LatencyClass, RollupKind};
use actis_core::models::record::Record;
use actis_core::models::reason::{DroppedReason, RejectedReason};
use actis_core::models::tenant::tenant_id_of;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::latency_stats::LatencyStats;
use crate::snapshot::project_row;
use crate::telemetry_stats::TelemetryStats;

/// 현재 UTC 시각 (ms)
fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// 락으로 보호되는 엔진 상태
struct StatsInner {
    /// 전체 테넌트 합산 행
    global: TelemetryStats,
    /// 테넌트 토큰 → 집계 행 (첫 비-메타 관측 시 지연 생성)
    tenants: BTreeMap<String, TelemetryStats>,
}

/// 메타 통계 엔진
pub struct MetaStats {
    /// 엔진 생성 시 발급되는 세션 UUID
    session_id: String,
    /// 프로세스 기동 시각 (ms)
    session_startup_ms: u64,
    config: StatsConfig,
    inner: Mutex<StatsInner>,
}

impl MetaStats {
    /// 엔진 생성 — 설정 검증 후 전역 행을 초기화한다
    pub fn new(config: StatsConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let session_id = Uuid::new_v4().to_string();
        let startup_ms = now_ms();
        let global = TelemetryStats::with_keys(
            &config,
            tenant_id_of(&config.meta_stats_tenant_token),
            &session_id,
            startup_ms,
            startup_ms,
        );
        debug!(session_id = %session_id, "메타 통계 엔진 생성");

        Ok(Self {
            session_id,
            session_startup_ms: startup_ms,
            config,
            inner: Mutex::new(StatsInner {
                global,
                tenants: BTreeMap::new(),
            }),
        })
    }

    /// 엔진 세션 UUID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 테넌트 행 조회/생성
    fn ensure_tenant<'a>(&self, inner: &'a mut StatsInner, token: &str) -> &'a mut TelemetryStats {
        inner.tenants.entry(token.to_string()).or_insert_with(|| {
            trace!(tenant = %tenant_id_of(token), "테넌트 통계 행 생성");
            TelemetryStats::with_keys(
                &self.config,
                tenant_id_of(token),
                &self.session_id,
                now_ms(),
                self.session_startup_ms,
            )
        })
    }

    // ============================================================
    // 뮤테이터 — 파이프라인 단계가 호출
    // ============================================================

    /// 이벤트 수신.
    ///
    /// 테넌트 행(메타 통계 이벤트 제외)과 전역 행의 수신 카운터·크기
    /// 통계를 갱신한다. 메타 통계 이벤트는 전역 행에서 별도 집계되어
    /// 자기 제외 판정의 기준이 된다.
    pub fn on_event_incoming(
        &self,
        tenant_token: &str,
        size_bytes: u64,
        latency: Option<LatencyClass>,
        is_meta_stats: bool,
    ) {
        let mut inner = self.inner.lock();

        if !is_meta_stats {
            let row = self.ensure_tenant(&mut inner, tenant_token);
            row.record_stats.received += 1;
            row.record_stats.observe_size(size_bytes);
            if let Some(class) = latency {
                let per = row.record_stats_by_latency.entry(class).or_default();
                per.received += 1;
                per.total_size_bytes += size_bytes;
            }
        }

        let global = &mut inner.global;
        global.record_stats.received += 1;
        if is_meta_stats {
            global.record_stats.received_meta_stats += 1;
        }
        global.record_stats.observe_size(size_bytes);
        if let Some(class) = latency {
            let per = global.record_stats_by_latency.entry(class).or_default();
            per.received += 1;
            per.total_size_bytes += size_bytes;
        }
    }

    /// 패키지 POST — 대역폭과 ACK 대기 카운터 (전역 전용)
    pub fn on_post_data(&self, bytes: u64, meta_stats_only: bool) {
        let mut inner = self.inner.lock();
        let pkg = &mut inner.global.package_stats;
        pkg.bytes_consumed += bytes;
        pkg.posted += 1;
        if meta_stats_only {
            pkg.metastats_only_posted += 1;
        }
    }

    /// 패키지 전송 성공.
    ///
    /// `record_ids_by_tenant`는 패키지에 담긴 레코드 ID → 테넌트 토큰 매핑.
    /// 전역 ACK/RTT/재시도 통계를 갱신하고, 행이 이미 있는 테넌트에
    /// 레코드당 1건의 전송과 기록→전송 지연 관측을 반영한다.
    pub fn on_package_sent_succeeded(
        &self,
        record_ids_by_tenant: &BTreeMap<String, String>,
        latency: Option<LatencyClass>,
        retry_failed_times: u64,
        duration_ms: u64,
        per_record_latencies_ms: &[u64],
        meta_stats_only: bool,
    ) {
        let records_sent = per_record_latencies_ms.len() as u64;
        let mut inner = self.inner.lock();

        let global = &mut inner.global;
        global.package_stats.acked += 1;
        global.package_stats.acked_success += 1;
        if meta_stats_only {
            global.package_stats.metastats_only_acked += 1;
        }
        *global
            .retries_count_distribution
            .entry(retry_failed_times)
            .or_insert(0) += 1;
        global.rtt_stats.observe(duration_ms);

        if let Some(class) = latency {
            let log_latency = global
                .log_to_send_latency_by_latency
                .entry(class)
                .or_insert_with(|| LatencyStats::with_keys(&self.config.log_to_send_latency));
            for &latency_ms in per_record_latencies_ms {
                log_latency.observe(latency_ms);
            }
        }

        global.record_stats.sent += records_sent;
        global.record_stats.sent_current_session += records_sent;
        if let Some(class) = latency {
            let per = global.record_stats_by_latency.entry(class).or_default();
            per.sent += records_sent;
            per.sent_current_session += records_sent;
        }

        // 행이 있는 테넌트만 — 여기서 새 행을 만들지 않는다
        for token in record_ids_by_tenant.values() {
            let Some(row) = inner.tenants.get_mut(token) else {
                continue;
            };
            if let Some(class) = latency {
                let log_latency = row
                    .log_to_send_latency_by_latency
                    .entry(class)
                    .or_insert_with(|| LatencyStats::with_keys(&self.config.log_to_send_latency));
                for &latency_ms in per_record_latencies_ms {
                    log_latency.observe(latency_ms);
                }
            }
            row.record_stats.sent += 1;
            row.record_stats.sent_current_session += 1;
            if let Some(class) = latency {
                let per = row.record_stats_by_latency.entry(class).or_default();
                per.sent += 1;
                per.sent_current_session += 1;
            }
        }
    }

    /// 패키지 전송 실패 (드롭 판정)
    pub fn on_package_failed(&self, http_status: u16) {
        let mut inner = self.inner.lock();
        let pkg = &mut inner.global.package_stats;
        pkg.acked += 1;
        pkg.acked_dropped += 1;
        *pkg.drops_by_http_code.entry(http_status).or_insert(0) += 1;
    }

    /// 패키지 재시도 판정
    pub fn on_package_retry(&self, http_status: u16, retry_failed_times: u64) {
        let mut inner = self.inner.lock();
        let pkg = &mut inner.global.package_stats;
        pkg.acked += 1;
        pkg.acked_retry += 1;
        *pkg.retries_by_http_code.entry(http_status).or_insert(0) += 1;
        *inner
            .global
            .retries_count_distribution
            .entry(retry_failed_times)
            .or_insert(0) += 1;
    }

    /// 레코드 드롭 — 테넌트별 카운트를 행에 반영하고 전역에 합산
    pub fn on_records_dropped(&self, reason: DroppedReason, counts_by_tenant: &BTreeMap<String, u64>) {
        let mut inner = self.inner.lock();
        let mut overall = 0u64;
        for (token, count) in counts_by_tenant {
            let row = self.ensure_tenant(&mut inner, token);
            *row.record_stats.dropped_by_reason.entry(reason).or_insert(0) += count;
            row.record_stats.dropped += count;
            overall += count;
        }
        let global = &mut inner.global.record_stats;
        *global.dropped_by_reason.entry(reason).or_insert(0) += overall;
        global.dropped += overall;
    }

    /// 저장소 공간 부족으로 레코드 유실
    pub fn on_records_overflown(&self, counts_by_tenant: &BTreeMap<String, u64>) {
        let mut inner = self.inner.lock();
        let mut overall = 0u64;
        for (token, count) in counts_by_tenant {
            let row = self.ensure_tenant(&mut inner, token);
            row.record_stats.overflown += count;
            overall += count;
        }
        inner.global.record_stats.overflown += overall;
    }

    /// 레코드 거부 — 테넌트별 카운트를 행에 반영하고 전역에 합산
    pub fn on_records_rejected(
        &self,
        reason: RejectedReason,
        counts_by_tenant: &BTreeMap<String, u64>,
    ) {
        let mut inner = self.inner.lock();
        let mut overall = 0u64;
        for (token, count) in counts_by_tenant {
            let row = self.ensure_tenant(&mut inner, token);
            *row.record_stats.rejected_by_reason.entry(reason).or_insert(0) += count;
            row.record_stats.rejected += count;
            overall += count;
        }
        let global = &mut inner.global.record_stats;
        *global.rejected_by_reason.entry(reason).or_insert(0) += overall;
        global.rejected += overall;
    }

    /// 오프라인 저장소 오픈 — 형식 라벨 기록
    pub fn on_storage_opened(&self, format_label: &str) {
        let mut inner = self.inner.lock();
        inner.global.offline_storage_stats.storage_format = format_label.to_string();
    }

    /// 오프라인 저장소 실패 — 마지막 실패 사유 기록
    pub fn on_storage_failed(&self, reason: &str) {
        let mut inner = self.inner.lock();
        inner.global.offline_storage_stats.last_failure_reason = reason.to_string();
    }

    // ============================================================
    // 리더 — 롤업 게이트와 스냅샷
    // ============================================================

    /// 메타 통계 자신 외의 활동이 있었는가.
    ///
    /// Ongoing 롤업을 게이트해서, 메타 통계 트래픽만 흐른 구간에
    /// 자기 자신에 대한 레코드를 만들어내는 되먹임을 막는다.
    pub fn has_stats_data_available(&self) -> bool {
        let inner = self.inner.lock();
        Self::has_data(&inner)
    }

    fn has_data(inner: &StatsInner) -> bool {
        let mut rejected = 0u64;
        let mut banned = 0u64;
        let mut dropped = 0u64;
        let mut received_not_stats = 0u64;
        for row in inner.tenants.values() {
            rejected += row.record_stats.rejected;
            banned += row.record_stats.banned;
            dropped += row.record_stats.dropped;
            received_not_stats += row
                .record_stats
                .received
                .saturating_sub(row.record_stats.received_meta_stats);
        }
        let pkg = &inner.global.package_stats;
        rejected > 0
            || banned > 0
            || dropped > 0
            || received_not_stats > 0
            || pkg.acked > pkg.metastats_only_acked
            || pkg.posted > pkg.metastats_only_posted
    }

    /// 롤업 수행 — 스냅샷 레코드 생산 후 리셋.
    ///
    /// Ongoing은 자기 제외 조건을 통과해야만 스냅샷·리셋이 일어나고,
    /// 전역 행은 Start/Stop에서만 레코드로 투영된다. Stop은 추가로
    /// 테넌트 맵과 전역 행의 모든 맵·히스토그램을 비운다.
    pub fn generate_stats_event(&self, kind: RollupKind) -> Vec<Record> {
        let mut records = Vec::new();
        {
            let mut inner = self.inner.lock();
            let now = now_ms();

            if kind != RollupKind::Ongoing || Self::has_data(&inner) {
                trace!(kind = kind.as_label(), "롤업 스냅샷 시작");
                for row in inner.tenants.values() {
                    records.push(project_row(row, kind, &self.config, &self.session_id, now));
                }
                if kind != RollupKind::Ongoing {
                    records.push(project_row(
                        &inner.global,
                        kind,
                        &self.config,
                        &self.session_id,
                        now,
                    ));
                }

                // 리셋은 테넌트 행에만 — 전역 행은 세션 내내 누적되고 Stop에서만 비운다
                let start = kind == RollupKind::Start;
                for row in inner.tenants.values_mut() {
                    row.reset(start, &self.config, &self.session_id, now);
                }
            }

            if kind == RollupKind::Stop {
                inner.tenants.clear();
                inner.global.clear_all();
            }
        }
        debug!(
            kind = kind.as_label(),
            records = records.len(),
            "롤업 완료"
        );
        records
    }
}
