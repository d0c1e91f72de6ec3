//! Run results and persisted history entries

use crate::types::{LatencyOutcome, ProbeKind, SpeedOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcomes of one measurement run, straight from the three probes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub latency: LatencyOutcome,
    pub download_speed: SpeedOutcome,
    pub upload_speed: SpeedOutcome,
}

impl RunReport {
    pub fn new(latency: LatencyOutcome, download_speed: SpeedOutcome, upload_speed: SpeedOutcome) -> Self {
        Self {
            latency,
            download_speed,
            upload_speed,
        }
    }

    /// Probes that produced the failure marker
    pub fn failed_probes(&self) -> Vec<ProbeKind> {
        let mut failed = Vec::new();
        if self.latency.is_failed() {
            failed.push(ProbeKind::Latency);
        }
        if self.download_speed.is_failed() {
            failed.push(ProbeKind::Download);
        }
        if self.upload_speed.is_failed() {
            failed.push(ProbeKind::Upload);
        }
        failed
    }

    pub fn all_measured(&self) -> bool {
        self.failed_probes().is_empty()
    }

    /// Rendered value of one probe, `Error` when it failed
    pub fn display_value(&self, kind: ProbeKind) -> String {
        match kind {
            ProbeKind::Latency => self.latency.render_with(|ms| ms.to_string()),
            ProbeKind::Download => self.download_speed.render_with(|mbps| format!("{:.2}", mbps)),
            ProbeKind::Upload => self.upload_speed.render_with(|mbps| format!("{:.2}", mbps)),
        }
    }
}

/// One persisted record of a completed run
///
/// Field names follow the stored history format:
/// `{"latency", "downloadSpeed", "uploadSpeed", "date"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub latency: LatencyOutcome,
    pub download_speed: SpeedOutcome,
    pub upload_speed: SpeedOutcome,
    pub date: DateTime<Utc>,
}

impl HistoryEntry {
    /// Stamp a report; all three metrics come from the same run
    pub fn from_report(report: RunReport, date: DateTime<Utc>) -> Self {
        Self {
            latency: report.latency,
            download_speed: report.download_speed,
            upload_speed: report.upload_speed,
            date,
        }
    }

    pub fn report(&self) -> RunReport {
        RunReport::new(self.latency, self.download_speed, self.upload_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeOutcome;
    use chrono::TimeZone;

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_failed_probes() {
        let report = RunReport::new(
            ProbeOutcome::Measured(120),
            ProbeOutcome::failed(),
            ProbeOutcome::Measured(3.5),
        );
        assert_eq!(report.failed_probes(), vec![ProbeKind::Download]);
        assert!(!report.all_measured());
    }

    #[test]
    fn test_display_value() {
        let report = RunReport::new(
            ProbeOutcome::Measured(87),
            ProbeOutcome::Measured(12.5),
            ProbeOutcome::failed(),
        );
        assert_eq!(report.display_value(ProbeKind::Latency), "87");
        assert_eq!(report.display_value(ProbeKind::Download), "12.50");
        assert_eq!(report.display_value(ProbeKind::Upload), "Error");
    }

    #[test]
    fn test_entry_from_report_keeps_values() {
        let report = RunReport::new(
            ProbeOutcome::Measured(40),
            ProbeOutcome::Measured(8.0),
            ProbeOutcome::Measured(2.25),
        );
        let entry = HistoryEntry::from_report(report, sample_date());
        assert_eq!(entry.report(), report);
        assert_eq!(entry.date, sample_date());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = HistoryEntry::from_report(
            RunReport::new(ProbeOutcome::Measured(40), ProbeOutcome::failed(), ProbeOutcome::Measured(2.25)),
            sample_date(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["latency"], 40);
        assert_eq!(json["downloadSpeed"], "Error");
        assert_eq!(json["uploadSpeed"], 2.25);
        assert_eq!(json["date"], "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_entry_parses_stored_format() {
        let stored = r#"{"latency":"Error","downloadSpeed":0.8,"uploadSpeed":1.6,"date":"2021-12-12T09:00:00.000Z"}"#;
        let entry: HistoryEntry = serde_json::from_str(stored).unwrap();
        assert!(entry.latency.is_failed());
        assert_eq!(entry.download_speed, ProbeOutcome::Measured(0.8));
    }
}
