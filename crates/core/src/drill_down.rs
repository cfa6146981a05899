//! Sequencing for date-click drill-down fetches.
//!
//! Each date click issues a numbered request. When responses arrive out of
//! order only the one matching the newest request is accepted.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownRequest {
    pub id: u64,
    pub date: NaiveDate,
    pub week: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DrillDownSequencer {
    latest: u64,
}

impl DrillDownSequencer {
    pub fn issue(&mut self, date: NaiveDate, week: u32) -> DrillDownRequest {
        self.latest += 1;
        tracing::debug!(id = self.latest, %date, week, "drill-down issued");
        DrillDownRequest {
            id: self.latest,
            date,
            week,
        }
    }

    pub fn accept(&self, id: u64) -> bool {
        let accepted = id != 0 && id == self.latest;
        if !accepted {
            tracing::debug!(id, latest = self.latest, "stale drill-down response dropped");
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_request_wins() {
        let mut seq = DrillDownSequencer::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let first = seq.issue(date, 2);
        let second = seq.issue(date, 2);
        assert!(!seq.accept(first.id));
        assert!(seq.accept(second.id));
        assert!(seq.accept(second.id));
    }

    #[test]
    fn nothing_accepted_before_first_issue() {
        let seq = DrillDownSequencer::default();
        assert!(!seq.accept(0));
        assert!(!seq.accept(1));
    }
}
