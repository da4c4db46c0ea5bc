//! 배치(패키지) 수준 카운터.
//!
//! 전송 단계가 보고하는 POST/ACK/재시도/드롭 카운터와
//! HTTP 응답 코드별 맵. 전역 스코프에서만 갱신된다.

use std::collections::BTreeMap;

/// 패키지 통계
#[derive(Debug, Clone, Default)]
pub struct PackageStats {
    /// ACK 대상이 아닌 전송 수 (fire-and-forget 경로)
    pub posted_not_to_be_acked: u64,
    /// POST된 패키지 수 (ACK 대기)
    pub posted: u64,
    /// POST분 중 메타 통계 전용 패키지 수
    pub metastats_only_posted: u64,
    /// ACK 수신 패키지 수
    pub acked: u64,
    /// ACK분 중 메타 통계 전용 패키지 수
    pub metastats_only_acked: u64,
    /// 성공 ACK
    pub acked_success: u64,
    /// 재시도 판정 ACK
    pub acked_retry: u64,
    /// 드롭 판정 ACK
    pub acked_dropped: u64,
    /// 소비한 업로드 대역폭 (바이트)
    pub bytes_consumed: u64,
    /// HTTP 응답 코드별 재시도 수
    pub retries_by_http_code: BTreeMap<u16, u64>,
    /// HTTP 응답 코드별 드롭 수
    pub drops_by_http_code: BTreeMap<u16, u64>,
}

impl PackageStats {
    /// 롤업 리셋 — 카운터와 코드별 맵 전체를 초기화
    pub fn reset(&mut self) {
        *self = PackageStats::default();
    }
}
