//! Calendar-period keys for the usage ledger.
//!
//! Quota counters are bucketed by UTC calendar month. The key format is
//! `YYYY-MM` so keys sort chronologically and match the `CHAR(7)` ledger
//! column.

use chrono::Datelike;

use crate::types::Timestamp;

/// The ledger period key for a given instant: `YYYY-MM` in UTC.
pub fn month_key(at: Timestamp) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// The ledger period key for the current instant.
pub fn current_month_key() -> String {
    month_key(chrono::Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_year_and_month() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(month_key(at), "2026-03");
    }

    #[test]
    fn rolls_over_at_month_boundary() {
        let before = chrono::Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let after = chrono::Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_ne!(month_key(before), month_key(after));
        assert_eq!(month_key(after), "2026-02");
    }

    #[test]
    fn key_is_seven_chars() {
        assert_eq!(current_month_key().len(), 7);
    }
}
