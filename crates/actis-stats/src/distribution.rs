//! 고정 버킷 히스토그램.
//!
//! 음이 아닌 정수 구간에 대한 빈도 분포. 키(버킷 하한)는 세션 시작 시
//! 한 번 초기화되며, 이후에는 값만 변한다. 키 0은 항상 존재한다.

use actis_core::config::DistributionParams;
use std::collections::BTreeMap;

/// 고정 버킷 분포
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    buckets: BTreeMap<u64, u64>,
}

impl Distribution {
    /// 빈 분포 생성 — 키 초기화 전까지 observe는 no-op
    pub fn new() -> Self {
        Self::default()
    }

    /// 버킷 키 초기화.
    ///
    /// 기존 내용을 비우고 키 0을 넣은 뒤, `total_spots - 1`개의 키를
    /// `first_value`에서 시작해 기하(×step) 또는 선형(+step)으로 생성한다.
    /// 퇴화 파라미터로 생긴 중복 키는 맵 삽입으로 자연 병합된다.
    pub fn init_keys(&mut self, first_value: u64, step: u64, total_spots: u32, geometric: bool) {
        self.buckets.clear();
        self.buckets.insert(0, 0);
        let mut last_key = 0u64;
        for _ in 1..total_spots {
            let key = if last_key == 0 {
                first_value
            } else if geometric {
                last_key.saturating_mul(step)
            } else {
                last_key.saturating_add(step)
            };
            self.buckets.insert(key, 0);
            last_key = key;
        }
    }

    /// 설정 파라미터로 키 초기화 (기하 방식)
    pub fn init_from(&mut self, params: &DistributionParams) {
        self.init_keys(params.first_value, params.factor, params.total_spots, true);
    }

    /// 관측값을 해당 버킷에 집계.
    ///
    /// value 이하의 가장 큰 키가 속한 버킷을 증가시킨다.
    /// 키가 없으면(초기화 전) no-op.
    pub fn observe(&mut self, value: u64) {
        if self.buckets.is_empty() {
            return;
        }
        if let Some((_, count)) = self.buckets.range_mut(..=value).next_back() {
            *count += 1;
        } else if let Some((_, count)) = self.buckets.iter_mut().next() {
            // 최소 키보다 작은 값도 첫 버킷에 집계
            *count += 1;
        }
    }

    /// 모든 값을 0으로 — 키는 유지
    pub fn reset_values(&mut self) {
        for count in self.buckets.values_mut() {
            *count = 0;
        }
    }

    /// 키와 값을 모두 비움
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// 키가 하나도 없는가
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// 전체 관측 횟수
    pub fn total_count(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// 버킷 뷰 (키 → 값)
    pub fn buckets(&self) -> &BTreeMap<u64, u64> {
        &self.buckets
    }

    /// 레코드 필드용 문자열 직렬화
    pub fn serialize(&self, range: bool) -> String {
        serialize_counts(&self.buckets, range)
    }
}

/// 정수 키 카운트 맵의 레코드 필드 직렬화.
///
/// range=true: 내부 버킷은 `k_i-k_{i+1}:v`, 마지막 버킷은 `>k:v`.
/// range=false: 모든 항목 `k:v`. 쉼표 구분.
/// 버킷 분포와 희소 카운트 맵(재시도 횟수 등)이 같은 형식을 쓴다.
pub fn serialize_counts(counts: &BTreeMap<u64, u64>, range: bool) -> String {
    let mut parts = Vec::with_capacity(counts.len());
    let mut iter = counts.iter().peekable();
    while let Some((key, value)) = iter.next() {
        match iter.peek() {
            Some((next_key, _)) if range => parts.push(format!("{key}-{next_key}:{value}")),
            Some(_) => parts.push(format!("{key}:{value}")),
            None if range => parts.push(format!(">{key}:{value}")),
            None => parts.push(format!("{key}:{value}")),
        }
    }
    parts.join(",")
}

/// 문자열 키 카운트 맵 직렬화 — `key:value` 쌍을 쉼표로 연결
pub fn serialize_string_counts(counts: &BTreeMap<String, u64>) -> String {
    counts
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join(",")
}
