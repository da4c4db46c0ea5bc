//! 통계 레코드 스키마.
//!
//! 메타 통계 엔진이 생산하는 논리 레코드 — 다운스트림 직렬화기와의 유일한 계약.
//! 수치 값은 모두 문자열로 변환되어 `Value`에 담긴다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 확장 속성 값.
///
/// 최소한 문자열 페이로드를 담는다. 카운터/분포는 문자열화된 형태로 들어간다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// 문자열 페이로드
    pub string_value: String,
}

impl Value {
    /// 문자열화 가능한 값으로부터 생성
    pub fn from_display<T: std::fmt::Display>(value: T) -> Self {
        Self {
            string_value: value.to_string(),
        }
    }
}

/// 레코드 본문 — 확장 속성 묶음
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Data {
    /// 확장 속성 (키 → 값)
    pub properties: BTreeMap<String, Value>,
}

/// 논리 통계 레코드
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    /// 수집 키 — `"o:" + 테넌트 ID` 형식
    pub i_key: String,
    /// 레코드 이름
    pub name: String,
    /// 레코드 기본 타입
    pub base_type: String,
    /// 레코드 본문 목록 (관례상 1개)
    pub data: Vec<Data>,
}

impl Record {
    /// 첫 번째 본문의 확장 속성 맵을 반환 (없으면 생성)
    pub fn properties_mut(&mut self) -> &mut BTreeMap<String, Value> {
        if self.data.is_empty() {
            self.data.push(Data::default());
        }
        &mut self.data[0].properties
    }

    /// 확장 속성 조회 (테스트/소비자 편의)
    pub fn property(&self, key: &str) -> Option<&str> {
        self.data
            .first()
            .and_then(|d| d.properties.get(key))
            .map(|v| v.string_value.as_str())
    }

    /// 0이 아닌 값만 확장 속성으로 추가
    pub fn insert_non_zero(&mut self, key: &str, value: u64) {
        if value != 0 {
            self.properties_mut()
                .insert(key.to_string(), Value::from_display(value));
        }
    }

    /// 문자열 값을 확장 속성으로 추가
    pub fn insert_string(&mut self, key: &str, value: impl Into<String>) {
        self.properties_mut().insert(
            key.to_string(),
            Value {
                string_value: value.into(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_non_zero_skips_zero() {
        let mut record = Record::default();
        record.insert_non_zero("rcv", 0);
        record.insert_non_zero("snt", 3);

        assert_eq!(record.property("rcv"), None);
        assert_eq!(record.property("snt"), Some("3"));
    }

    #[test]
    fn record_serde_roundtrip() {
        let mut record = Record {
            i_key: "o:abc".to_string(),
            name: "act_stats".to_string(),
            base_type: "act_stats".to_string(),
            data: Vec::new(),
        };
        record.insert_string("stats_rollup_kind", "start");

        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.i_key, "o:abc");
        assert_eq!(back.property("stats_rollup_kind"), Some("start"));
    }
}
