//! 스냅샷 투영.
//!
//! TelemetryStats 한 행을 `act_stats` 레코드 하나로 변환한다.
//! 0인 카운터와 빈 맵은 생략되고, 분포는 문자열로 직렬화된다.

use actis_core::config::StatsConfig;
use actis_core::models::latency::{LatencyClass, RollupKind};
use actis_core::models::record::Record;
use actis_core::models::reason::DroppedReason;
use actis_core::models::tenant::tenant_id_of;
use std::collections::BTreeMap;

use crate::distribution::{serialize_counts, serialize_string_counts};
use crate::record_stats::RecordStats;
use crate::telemetry_stats::TelemetryStats;

/// HTTP 코드별 카운트를 `{prefix}_{code}` 키로 추가
fn add_http_code_counts(record: &mut Record, prefix: &str, counts: &BTreeMap<u16, u64>) {
    for (code, count) in counts {
        record.insert_non_zero(&format!("{prefix}_{code}"), *count);
    }
}

/// 행 하나를 레코드로 투영
pub(crate) fn project_row(
    stats: &TelemetryStats,
    kind: RollupKind,
    config: &StatsConfig,
    session_id: &str,
    now_ms: u64,
) -> Record {
    let mut record = Record {
        i_key: format!("o:{}", tenant_id_of(&config.meta_stats_tenant_token)),
        name: "act_stats".to_string(),
        base_type: "act_stats".to_string(),
        data: Vec::new(),
    };

    // 세션 필드
    record.insert_string("act_stats_id", session_id);
    record.insert_non_zero("s_stime", stats.session_start_ms);
    record.insert_non_zero("stats_stime", stats.stats_start_ms);
    record.insert_non_zero("s_Firststime", stats.session_startup_ms);
    record.insert_non_zero("stats_etime", now_ms);
    record.insert_string("stats_rollup_kind", kind.as_label());
    record.insert_non_zero("st_freq", u64::from(config.meta_stats_send_interval_secs));

    // 저장소 필드
    if stats.offline_storage_enabled {
        let storage = &stats.offline_storage_stats;
        record.insert_string("off_type", storage.storage_format.clone());
        if !storage.last_failure_reason.is_empty() {
            record.insert_string("off_last_failure", storage.last_failure_reason.clone());
        }
        record.insert_non_zero("config_off_size", storage.file_size_bytes);
    }

    // 패키지 통계
    let pkg = &stats.package_stats;
    record.insert_non_zero("rqs_not_to_be_acked", pkg.posted_not_to_be_acked);
    record.insert_non_zero("rqs_to_be_acked", pkg.posted);
    record.insert_non_zero("rqs_acked", pkg.acked);
    record.insert_non_zero("rqs_acked_succ", pkg.acked_success);
    record.insert_non_zero("rqs_acked_ret", pkg.acked_retry);
    record.insert_non_zero("rqs_acked_drp", pkg.acked_dropped);
    add_http_code_counts(&mut record, "rqs_acked_drp_on_HTTP", &pkg.drops_by_http_code);
    add_http_code_counts(&mut record, "rqs_acked_ret_on_HTTP", &pkg.retries_by_http_code);
    record.insert_non_zero("rm_bw_bytes_consumed_count", pkg.bytes_consumed);

    // 재시도 횟수 분포 — ACK가 하나라도 있어야 의미가 있음
    if pkg.acked > 0 && !stats.retries_count_distribution.is_empty() {
        record.insert_string(
            "rqs_fail_on_HTTP_retries_count_distribution",
            serialize_counts(&stats.retries_count_distribution, false),
        );
    }

    // RTT 통계 — 성공 ACK가 있을 때만
    if pkg.acked_success > 0 {
        record.insert_non_zero("rtt_millisec_max", stats.rtt_stats.max_ms);
        record.insert_non_zero("rtt_millisec_min", stats.rtt_stats.min_ms);
        if !stats.rtt_stats.distribution.is_empty() {
            record.insert_string(
                "rtt_millisec_distribution",
                stats.rtt_stats.distribution.serialize(true),
            );
        }
    }

    // 레코드 통계
    let rs = &stats.record_stats;
    record.insert_non_zero("r_ban", rs.banned);
    record.insert_non_zero("rcv", rs.received);
    record.insert_non_zero("snt", rs.sent);
    record.insert_non_zero("rcds_sent_curr_session", rs.sent_current_session);
    record.insert_non_zero("rcds_sent_prev_session", rs.sent_previous_session);
    record.insert_non_zero("rej", rs.rejected);
    add_rejected_reason_counts(&mut record, rs);
    record.insert_non_zero("drp", rs.dropped);
    record.insert_non_zero("d_disk_full", rs.overflown);
    record.insert_non_zero(
        "d_io_fail",
        reason_count(rs, DroppedReason::OfflineStorageSaveFailed),
    );
    record.insert_non_zero("d_retry_lmt", reason_count(rs, DroppedReason::RetryExceeded));
    add_http_code_counts(&mut record, "rcds_drp_on_HTTP", &rs.dropped_by_http_code);

    if !rs.exceptions_by_event_type.is_empty() {
        record.insert_string(
            "exceptions_per_eventtype_count",
            serialize_string_counts(&rs.exceptions_by_event_type),
        );
    }
    if !rs.records_by_event_type.is_empty() {
        record.insert_string(
            "rcds_per_eventtype_count",
            serialize_string_counts(&rs.records_by_event_type),
        );
    }

    // 크기 통계 — 수신 레코드가 있을 때만
    if rs.received > 0 {
        record.insert_non_zero("rcd_size_bytes_max", rs.max_size_bytes);
        record.insert_non_zero("rcd_size_bytes_min", rs.min_size_bytes);
        record.insert_non_zero("rcds_received_size_bytes", rs.total_size_bytes);
        if !rs.size_kib_distribution.is_empty() {
            record.insert_string(
                "rcd_size_kb_distribution",
                rs.size_kib_distribution.serialize(true),
            );
        }
    }

    // 지연 클래스별 블록
    let default_class_stats = RecordStats::default();
    for class in LatencyClass::ALL {
        let prefix = class.field_prefix();
        let per = stats
            .record_stats_by_latency
            .get(&class)
            .unwrap_or(&default_class_stats);

        record.insert_non_zero(&format!("{prefix}_r_ban"), per.banned);
        record.insert_non_zero(&format!("{prefix}_rcv"), per.received);
        record.insert_non_zero(&format!("{prefix}_snt"), per.sent);
        record.insert_non_zero(
            &format!("{prefix}_rcds_sent_count_current_session"),
            per.sent_current_session,
        );
        record.insert_non_zero(
            &format!("{prefix}_rcds_sent_count_previous_sessions"),
            per.sent_previous_session,
        );
        record.insert_non_zero(&format!("{prefix}_drp"), per.dropped);
        record.insert_non_zero(&format!("{prefix}_d_disk_full"), per.overflown);
        record.insert_non_zero(&format!("{prefix}_rej"), per.rejected);

        if per.received > 0 {
            record.insert_non_zero(
                &format!("{prefix}_rcds_received_size_bytes"),
                per.total_size_bytes,
            );
        }

        if per.sent > 0 {
            if let Some(latency) = stats.log_to_send_latency_by_latency.get(&class) {
                record.insert_non_zero(
                    &format!("{prefix}_log_to_successful_send_latency_millisec_max"),
                    latency.max_ms,
                );
                record.insert_non_zero(
                    &format!("{prefix}_log_to_successful_send_latency_millisec_min"),
                    latency.min_ms,
                );
                if !latency.distribution.is_empty() {
                    record.insert_string(
                        &format!("{prefix}_log_to_successful_send_latency_millisec_distribution"),
                        latency.distribution.serialize(true),
                    );
                }
            }
        }
    }

    record
}

fn reason_count(rs: &RecordStats, reason: DroppedReason) -> u64 {
    rs.dropped_by_reason.get(&reason).copied().unwrap_or(0)
}

/// 거부 사유를 보고 키(`r_inv`/`r_exp`/`r_403`/`r_kl`/`r_size`)로 묶어 합산
fn add_rejected_reason_counts(record: &mut Record, rs: &RecordStats) {
    let mut by_report_key: BTreeMap<&'static str, u64> = BTreeMap::new();
    for (reason, count) in &rs.rejected_by_reason {
        *by_report_key.entry(reason.report_key()).or_insert(0) += count;
    }
    for (key, count) in by_report_key {
        record.insert_non_zero(key, count);
    }
}
