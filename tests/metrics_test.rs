//! Unit tests for metrics.rs module

use plateforme_ia::metrics::MetricsCollector;
use plateforme_ia::notify::Severity;
use std::time::Duration;

#[test]
fn test_metric_names_are_prefixed() {
    let collector = MetricsCollector::default();
    let names = [
        collector.notifications_total,
        collector.chat_turns_total,
        collector.chat_reply_delay,
        collector.files_accepted_total,
        collector.files_rejected_total,
        collector.files_completed_total,
        collector.files_in_collection,
        collector.connect_attempts_total,
        collector.queries_executed_total,
        collector.database_connected,
        collector.reviews_submitted_total,
        collector.review_reactions_total,
        collector.tab_switches_total,
        collector.command_duration,
    ];
    for name in names {
        assert!(name.starts_with("plateforme_ia_"), "{name}");
    }
}

#[test]
fn test_metrics_initialization() {
    assert!(MetricsCollector::init().is_ok());
    // the global recorder can only be installed once
    assert!(MetricsCollector::init().is_err());
}

#[test]
fn test_every_recorder_call_is_safe() {
    let collector = MetricsCollector::default();
    collector.record_notification(Severity::Destructive);
    collector.record_chat_turn("wo", Duration::from_millis(1500));
    collector.record_upload_batch(3, 0);
    collector.record_file_completed(false);
    collector.set_file_count(3);
    collector.record_connect_attempt("MySQL", true);
    collector.set_database_connected(false);
    collector.record_query();
    collector.record_review_submitted(4);
    collector.record_review_reaction("like");
    collector.record_tab_switch("chat");
    collector.record_command("send", Duration::from_micros(40));
}
