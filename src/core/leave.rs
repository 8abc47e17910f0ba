use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::ApiError;

/// Requests must be filed this many days before the leave starts,
/// boundary inclusive.
pub const MIN_ADVANCE_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// PENDING may move to APPROVED or REJECTED; both of those are terminal.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        self == LeaveStatus::Pending && next != LeaveStatus::Pending
    }
}

pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::Validation(
            "start_date must be before or equal to end_date".into(),
        ));
    }
    Ok(())
}

/// The advance-notice window, measured in whole days from the submission
/// date.
pub fn enforce_advance_notice(today: NaiveDate, start: NaiveDate) -> Result<(), ApiError> {
    if (start - today).num_days() < MIN_ADVANCE_DAYS {
        return Err(ApiError::Validation(format!(
            "Leave must be requested at least {MIN_ADVANCE_DAYS} days before start_date"
        )));
    }
    Ok(())
}

/// Inclusive overlap: the ranges share at least one day.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverted_dates_are_rejected() {
        assert!(validate_date_order(d(2026, 8, 10), d(2026, 8, 9)).is_err());
        assert!(validate_date_order(d(2026, 8, 10), d(2026, 8, 10)).is_ok());
    }

    #[test]
    fn one_day_notice_is_too_short() {
        let today = d(2026, 8, 5);
        assert!(enforce_advance_notice(today, d(2026, 8, 6)).is_err());
    }

    #[test]
    fn exactly_three_days_notice_is_accepted() {
        let today = d(2026, 8, 5);
        assert!(enforce_advance_notice(today, d(2026, 8, 8)).is_ok());
        assert!(enforce_advance_notice(today, d(2026, 8, 7)).is_err());
    }

    #[test]
    fn overlap_is_endpoint_inclusive() {
        // Sharing a single boundary day is already a conflict.
        assert!(ranges_overlap(
            d(2026, 8, 1),
            d(2026, 8, 5),
            d(2026, 8, 5),
            d(2026, 8, 9)
        ));
        assert!(!ranges_overlap(
            d(2026, 8, 1),
            d(2026, 8, 4),
            d(2026, 8, 5),
            d(2026, 8, 9)
        ));
    }

    #[test]
    fn containment_counts_as_overlap() {
        assert!(ranges_overlap(
            d(2026, 8, 1),
            d(2026, 8, 31),
            d(2026, 8, 10),
            d(2026, 8, 12)
        ));
    }

    #[test]
    fn pending_is_the_only_mutable_status() {
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Rejected.can_transition_to(LeaveStatus::Approved));
        assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(LeaveStatus::Approved.to_string(), "APPROVED");
        assert_eq!(LeaveStatus::from_str("PENDING").unwrap(), LeaveStatus::Pending);
        assert!(LeaveStatus::from_str("pending").is_err());
    }
}
