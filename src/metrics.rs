use metrics::{counter, gauge, histogram};
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::notify::Severity;

/// Metrics collection and management
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    // Notification boundary
    pub notifications_total: &'static str,

    // Chat metrics
    pub chat_turns_total: &'static str,
    pub chat_reply_delay: &'static str,

    // Upload metrics
    pub files_accepted_total: &'static str,
    pub files_rejected_total: &'static str,
    pub files_completed_total: &'static str,
    pub files_in_collection: &'static str,

    // Database metrics
    pub connect_attempts_total: &'static str,
    pub queries_executed_total: &'static str,
    pub database_connected: &'static str,

    // Review metrics
    pub reviews_submitted_total: &'static str,
    pub review_reactions_total: &'static str,

    // Shell metrics
    pub tab_switches_total: &'static str,
    pub command_duration: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            notifications_total: "plateforme_ia_notifications_total",

            chat_turns_total: "plateforme_ia_chat_turns_total",
            chat_reply_delay: "plateforme_ia_chat_reply_delay_seconds",

            files_accepted_total: "plateforme_ia_files_accepted_total",
            files_rejected_total: "plateforme_ia_files_rejected_total",
            files_completed_total: "plateforme_ia_files_completed_total",
            files_in_collection: "plateforme_ia_files_in_collection",

            connect_attempts_total: "plateforme_ia_connect_attempts_total",
            queries_executed_total: "plateforme_ia_queries_executed_total",
            database_connected: "plateforme_ia_database_connected",

            reviews_submitted_total: "plateforme_ia_reviews_submitted_total",
            review_reactions_total: "plateforme_ia_review_reactions_total",

            tab_switches_total: "plateforme_ia_tab_switches_total",
            command_duration: "plateforme_ia_command_duration_seconds",
        }
    }
}

impl MetricsCollector {
    /// Initialize metrics collection
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|_| PlatformError::Other("Failed to initialize metrics recorder".into()))
    }

    /// Record a notice surfaced to the user
    pub fn record_notification(&self, severity: Severity) {
        counter!(self.notifications_total, "severity" => severity.as_str()).increment(1);
    }

    /// Record a completed chat turn
    pub fn record_chat_turn(&self, language: &str, delay: Duration) {
        counter!(self.chat_turns_total, "language" => language.to_string()).increment(1);
        histogram!(self.chat_reply_delay).record(delay.as_secs_f64());
    }

    /// Record files accepted and rejected by one batch
    pub fn record_upload_batch(&self, accepted: usize, rejected: usize) {
        counter!(self.files_accepted_total).increment(accepted as u64);
        counter!(self.files_rejected_total).increment(rejected as u64);
    }

    /// Record the end of one ingestion pipeline
    pub fn record_file_completed(&self, success: bool) {
        let status = if success { "ready" } else { "error" };
        counter!(self.files_completed_total, "status" => status).increment(1);
    }

    /// Update the size of the uploaded-file collection
    pub fn set_file_count(&self, count: usize) {
        gauge!(self.files_in_collection).set(count as f64);
    }

    /// Record a resolved connection attempt
    pub fn record_connect_attempt(&self, kind: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(
            self.connect_attempts_total,
            "kind" => kind.to_string(),
            "status" => status
        )
        .increment(1);
    }

    /// Update the connection flag
    pub fn set_database_connected(&self, connected: bool) {
        gauge!(self.database_connected).set(if connected { 1.0 } else { 0.0 });
    }

    /// Record a simulated query execution
    pub fn record_query(&self) {
        counter!(self.queries_executed_total).increment(1);
    }

    /// Record a published review
    pub fn record_review_submitted(&self, rating: u8) {
        counter!(self.reviews_submitted_total, "rating" => rating.to_string()).increment(1);
    }

    /// Record a like or dislike
    pub fn record_review_reaction(&self, reaction: &'static str) {
        counter!(self.review_reactions_total, "reaction" => reaction).increment(1);
    }

    /// Record an effective tab change
    pub fn record_tab_switch(&self, tab: &'static str) {
        counter!(self.tab_switches_total, "tab" => tab).increment(1);
    }

    /// Record how long a console command took
    pub fn record_command(&self, command: &str, duration: Duration) {
        histogram!(self.command_duration, "command" => command.to_string())
            .record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.notifications_total, "plateforme_ia_notifications_total");
    }

    #[test]
    fn test_recording_without_recorder_is_harmless() {
        let collector = MetricsCollector::default();
        collector.record_notification(Severity::Info);
        collector.record_upload_batch(2, 1);
        collector.set_database_connected(true);
    }
}
