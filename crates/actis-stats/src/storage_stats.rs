//! 오프라인 저장소 통계.
//!
//! 저장소 형식 라벨, 마지막 실패 사유, 파일 크기, 쓰기 크기 히스토그램.
//! 형식 라벨은 저장소 오픈 시 한 번 설정되어 롤업 리셋에도 유지된다.

use crate::distribution::Distribution;

/// 오프라인 저장소 통계
#[derive(Debug, Clone, Default)]
pub struct OfflineStorageStats {
    /// 저장소 형식 라벨 (예: "sqlite")
    pub storage_format: String,
    /// 마지막 실패 사유 — 비어 있으면 보고 생략
    pub last_failure_reason: String,
    /// 저장소 파일 크기 (바이트)
    pub file_size_bytes: u64,
    /// 저장 크기 분포 (KiB)
    pub save_size_kib: Distribution,
    /// 덮어쓰기 크기 분포 (KiB)
    pub overwrite_size_kib: Distribution,
}

impl OfflineStorageStats {
    /// 롤업 리셋 — 히스토그램 값만 0으로, 라벨·파일 크기는 유지
    pub fn reset(&mut self) {
        self.save_size_kib.reset_values();
        self.overwrite_size_kib.reset_values();
    }

    /// 세션 종료 정리 — 히스토그램을 완전히 비움
    pub fn clear_maps(&mut self) {
        self.save_size_kib.clear();
        self.overwrite_size_kib.clear();
    }
}
