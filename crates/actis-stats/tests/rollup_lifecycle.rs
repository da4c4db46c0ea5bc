//! 롤업 상태 기계 통합 테스트.
//!
//! Start/Ongoing/Stop 전체 생애주기: 스냅샷 생산, 자기 제외 게이트,
//! 리셋, Stop 정리 후 재시작.

use std::collections::BTreeMap;

use actis_core::config::StatsConfig;
use actis_core::models::latency::{LatencyClass, RollupKind};
use actis_core::models::reason::DroppedReason;
use actis_stats::MetaStats;

fn engine() -> MetaStats {
    let config = StatsConfig {
        meta_stats_tenant_token: "statstenant-ingestkey".to_string(),
        ..StatsConfig::default()
    };
    MetaStats::new(config).unwrap()
}

fn tenant_counts(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
    entries
        .iter()
        .map(|(token, count)| (token.to_string(), *count))
        .collect()
}

#[test]
fn fresh_engine_has_no_data() {
    let stats = engine();
    assert!(!stats.has_stats_data_available());
    // 게이트에 막혀 Ongoing은 빈 결과
    assert!(stats.generate_stats_event(RollupKind::Ongoing).is_empty());
}

#[test]
fn start_rollup_emits_tenant_and_global_records() {
    let stats = engine();
    stats.on_event_incoming("abc-def", 500, Some(LatencyClass::Normal), false);

    let records = stats.generate_stats_event(RollupKind::Start);

    // 테넌트 행 + 전역 행
    assert_eq!(records.len(), 2);
    let tenant_record = &records[0];
    assert_eq!(tenant_record.i_key, "o:statstenant");
    assert_eq!(tenant_record.property("rcv"), Some("1"));
    assert_eq!(tenant_record.property("ln_rcv"), Some("1"));
    assert_eq!(tenant_record.property("rcds_received_size_bytes"), Some("500"));
    assert_eq!(tenant_record.property("ln_rcds_received_size_bytes"), Some("500"));
    assert_eq!(tenant_record.property("stats_rollup_kind"), Some("start"));

    let global_record = &records[1];
    assert_eq!(global_record.property("rcv"), Some("1"));
    assert_eq!(global_record.property("act_stats_id"), Some(stats.session_id()));
}

#[test]
fn metastats_only_traffic_gates_ongoing() {
    let stats = engine();

    // 메타 통계 전용 POST와 메타 통계 이벤트만 흐른 구간
    stats.on_post_data(2_048, true);
    stats.on_event_incoming("statstenant-ingestkey", 300, None, true);

    assert!(!stats.has_stats_data_available());
    assert!(stats.generate_stats_event(RollupKind::Ongoing).is_empty());

    // 게이트에 막힌 Ongoing은 리셋도 하지 않는다 — 다음 Start 스냅샷에
    // POST 카운터가 그대로 남아 있어야 함
    let records = stats.generate_stats_event(RollupKind::Start);
    let global_record = records.last().unwrap();
    assert_eq!(global_record.property("rqs_to_be_acked"), Some("1"));
    assert_eq!(global_record.property("rm_bw_bytes_consumed_count"), Some("2048"));
}

#[test]
fn real_traffic_opens_the_gate() {
    let stats = engine();
    stats.on_event_incoming("t1-key", 128, None, false);
    assert!(stats.has_stats_data_available());

    let records = stats.generate_stats_event(RollupKind::Ongoing);
    // Ongoing은 테넌트 행만 투영한다
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].property("stats_rollup_kind"), Some("ongoing"));

    // 롤업이 테넌트 카운터를 리셋 → 새 활동 없이는 게이트가 다시 닫힘
    assert!(!stats.has_stats_data_available());
    assert!(stats.generate_stats_event(RollupKind::Ongoing).is_empty());
}

#[test]
fn package_activity_keeps_gate_open_until_stop() {
    let stats = engine();
    // 비-메타 패키지 ACK는 전역 카운터라 롤업 리셋에도 살아남는다
    stats.on_package_failed(500);
    assert!(stats.has_stats_data_available());
    let _ = stats.generate_stats_event(RollupKind::Ongoing);
    assert!(stats.has_stats_data_available());

    // 리셋은 테넌트 행에만 — Start 이후에도 전역 패키지 카운터는 누적
    let _ = stats.generate_stats_event(RollupKind::Start);
    assert!(stats.has_stats_data_available());

    // Stop만이 전역 행을 비워 게이트를 닫는다
    let _ = stats.generate_stats_event(RollupKind::Stop);
    assert!(!stats.has_stats_data_available());
}

#[test]
fn stop_clears_everything() {
    let stats = engine();
    stats.on_event_incoming("t1-key", 256, Some(LatencyClass::Max), false);
    stats.on_records_dropped(DroppedReason::RetryExceeded, &tenant_counts(&[("t1-key", 2)]));
    stats.on_package_retry(503, 1);

    let records = stats.generate_stats_event(RollupKind::Stop);
    assert_eq!(records.len(), 2); // 테넌트 + 전역
    assert_eq!(records[0].property("stats_rollup_kind"), Some("stop"));

    // Stop 후에는 테넌트 맵과 전역 카운터가 모두 비어 게이트가 닫힘
    assert!(!stats.has_stats_data_available());
    assert!(stats.generate_stats_event(RollupKind::Ongoing).is_empty());

    // 바로 다음 Stop은 전역 행 하나만 낸다
    let records = stats.generate_stats_event(RollupKind::Stop);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].property("rcv"), None);
}

#[test]
fn restart_after_stop_keeps_engine_session() {
    let stats = engine();
    stats.on_event_incoming("t1-key", 100, None, false);
    let _ = stats.generate_stats_event(RollupKind::Stop);

    // Stop 이후에도 뮤테이터는 유효하고, Start는 새 구간을 연다
    stats.on_event_incoming("t2-key", 200, None, false);
    let records = stats.generate_stats_event(RollupKind::Start);

    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.property("act_stats_id"), Some(stats.session_id()));
    }
    assert_eq!(records[0].property("rcv"), Some("1"));
}

#[test]
fn counters_accumulate_between_rollups() {
    let stats = engine();
    for _ in 0..3 {
        stats.on_event_incoming("t1-key", 1_000, Some(LatencyClass::RealTime), false);
    }
    stats.on_event_incoming("t1-key", 1_000, None, false);

    let records = stats.generate_stats_event(RollupKind::Start);
    let tenant_record = &records[0];
    assert_eq!(tenant_record.property("rcv"), Some("4"));
    assert_eq!(tenant_record.property("lr_rcv"), Some("3"));
    assert_eq!(tenant_record.property("rcds_received_size_bytes"), Some("4000"));

    // Start 리셋 후 빈 구간 — 테넌트 행은 남아 있지만 카운터는 0
    let records = stats.generate_stats_event(RollupKind::Start);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].property("rcv"), None);
}

#[test]
fn concurrent_mutators_serialize_on_engine_lock() {
    use std::sync::Arc;
    use std::thread;

    let stats = Arc::new(engine());
    let mut handles = Vec::new();
    // 수집 스레드 4개가 동시에 이벤트를 밀어 넣는다
    for _ in 0..4 {
        let stats = Arc::clone(&stats);
        handles.push(thread::spawn(move || {
            for _ in 0..250 {
                stats.on_event_incoming("t1-key", 100, Some(LatencyClass::Normal), false);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let records = stats.generate_stats_event(RollupKind::Start);
    assert_eq!(records[0].property("rcv"), Some("1000"));
    assert_eq!(records[0].property("ln_rcv"), Some("1000"));
}
