//! # actis-stats
//!
//! ACTIS 메타 통계 엔진 — 텔레메트리 파이프라인 자신의 생애주기 이벤트
//! (수신, POST, ACK, 재시도, 드롭, 거부, 저장소)를 집계해
//! 주기적으로 `act_stats` 합성 레코드를 생산한다.
//!
//! ## 구조
//!
//! - [`distribution`] — 고정 버킷 히스토그램과 문자열 직렬화
//! - [`latency_stats`] — min/max + 분포
//! - [`record_stats`] / [`package_stats`] / [`storage_stats`] — 스코프별 카운터
//! - [`telemetry_stats`] — 테넌트/전역 복합 집계와 롤업 리셋
//! - [`meta_stats`] — 공개 엔진 표면: 뮤테이터, 자기 제외 게이트, 롤업 상태 기계
//!
//! ## 동시성
//!
//! 엔진 하나가 상태 전체를 독점 소유하고, 모든 연산이 단일 락으로
//! 직렬화된다. 뮤테이터는 블로킹하지 않으며 락 안에서 I/O가 없다.

pub mod distribution;
pub mod latency_stats;
pub mod meta_stats;
pub mod package_stats;
pub mod record_stats;
mod snapshot;
pub mod storage_stats;
pub mod telemetry_stats;

pub use distribution::Distribution;
pub use latency_stats::LatencyStats;
pub use meta_stats::MetaStats;
pub use package_stats::PackageStats;
pub use record_stats::RecordStats;
pub use storage_stats::OfflineStorageStats;
pub use telemetry_stats::TelemetryStats;
