//! 레코드 수준 카운터.
//!
//! 스코프(전역 또는 테넌트별, 선택적으로 지연 클래스별) 하나에 대한
//! 수신/전송/드롭/거부/차단 카운터, 크기 히스토그램, 사유별 맵.

use actis_core::models::reason::{DroppedReason, RejectedReason};
use std::collections::BTreeMap;

use crate::distribution::Distribution;

/// 레코드 통계
#[derive(Debug, Clone)]
pub struct RecordStats {
    /// 수신 레코드 수
    pub received: u64,
    /// 수신분 중 메타 통계 레코드 수 (전역 스코프에서만 증가)
    pub received_meta_stats: u64,
    /// 전송 완료 레코드 수
    pub sent: u64,
    /// 현재 세션에서 생성되어 전송된 수
    pub sent_current_session: u64,
    /// 이전 세션 잔여분 전송 수 — 영속화 설계 확정 전까지 미집계
    pub sent_previous_session: u64,
    /// 드롭된 레코드 수
    pub dropped: u64,
    /// 저장소 공간 부족으로 유실된 수
    pub overflown: u64,
    /// 거부된 레코드 수
    pub rejected: u64,
    /// 테넌트 차단으로 버려진 수
    pub banned: u64,
    /// 레코드 크기 분포 (KiB)
    pub size_kib_distribution: Distribution,
    /// 최소 레코드 크기 (바이트) — 관측 전에는 `u64::MAX`
    pub min_size_bytes: u64,
    /// 최대 레코드 크기 (바이트)
    pub max_size_bytes: u64,
    /// 수신 레코드 총 바이트
    pub total_size_bytes: u64,
    /// 드롭 사유별 카운트
    pub dropped_by_reason: BTreeMap<DroppedReason, u64>,
    /// 거부 사유별 카운트
    pub rejected_by_reason: BTreeMap<RejectedReason, u64>,
    /// 이벤트 타입별 레코드 수
    pub records_by_event_type: BTreeMap<String, u64>,
    /// 이벤트 타입별 예외 수
    pub exceptions_by_event_type: BTreeMap<String, u64>,
    /// HTTP 응답 코드별 드롭 수
    pub dropped_by_http_code: BTreeMap<u16, u64>,
}

impl Default for RecordStats {
    fn default() -> Self {
        Self {
            received: 0,
            received_meta_stats: 0,
            sent: 0,
            sent_current_session: 0,
            sent_previous_session: 0,
            dropped: 0,
            overflown: 0,
            rejected: 0,
            banned: 0,
            size_kib_distribution: Distribution::new(),
            min_size_bytes: u64::MAX,
            max_size_bytes: 0,
            total_size_bytes: 0,
            dropped_by_reason: BTreeMap::new(),
            rejected_by_reason: BTreeMap::new(),
            records_by_event_type: BTreeMap::new(),
            exceptions_by_event_type: BTreeMap::new(),
            dropped_by_http_code: BTreeMap::new(),
        }
    }
}

impl RecordStats {
    /// 크기 관측 — KiB 분포(1024로 내림 나눗셈) + 바이트 min/max/총합
    pub fn observe_size(&mut self, size_bytes: u64) {
        self.size_kib_distribution.observe(size_bytes / 1024);
        self.min_size_bytes = self.min_size_bytes.min(size_bytes);
        self.max_size_bytes = self.max_size_bytes.max(size_bytes);
        self.total_size_bytes += size_bytes;
    }

    /// 롤업 리셋 — 카운터·사유 맵을 비우고 크기 분포는 키만 남긴다
    pub fn reset(&mut self) {
        self.received = 0;
        self.received_meta_stats = 0;
        self.sent = 0;
        self.sent_current_session = 0;
        self.sent_previous_session = 0;
        self.dropped = 0;
        self.overflown = 0;
        self.rejected = 0;
        self.banned = 0;
        self.size_kib_distribution.reset_values();
        self.min_size_bytes = u64::MAX;
        self.max_size_bytes = 0;
        self.total_size_bytes = 0;
        self.dropped_by_reason.clear();
        self.rejected_by_reason.clear();
        for count in self.records_by_event_type.values_mut() {
            *count = 0;
        }
        for count in self.exceptions_by_event_type.values_mut() {
            *count = 0;
        }
        self.dropped_by_http_code.clear();
    }

    /// 세션 종료 정리 — 모든 맵과 히스토그램을 완전히 비움
    pub fn clear_maps(&mut self) {
        self.size_kib_distribution.clear();
        self.dropped_by_reason.clear();
        self.rejected_by_reason.clear();
        self.records_by_event_type.clear();
        self.exceptions_by_event_type.clear();
        self.dropped_by_http_code.clear();
    }
}
