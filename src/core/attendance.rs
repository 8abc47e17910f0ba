use chrono::NaiveTime;

/// Expected punch times for an account on a given date.
pub struct ScheduleTimes {
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
}

/// Metrics derived from actual punches against the day's schedule.
///
/// Every field is nullable: without a schedule there is nothing to measure
/// against, so all four stay `None`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DerivedMetrics {
    pub late_minutes: Option<i64>,
    pub undertime_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub is_absent: Option<bool>,
}

fn minutes_between(earlier: NaiveTime, later: NaiveTime) -> i64 {
    (later - earlier).num_minutes()
}

/// Compute late/undertime/overtime minutes and the absence flag for one
/// attendance record. A missing schedule is not an error.
pub fn derive_metrics(
    schedule: Option<&ScheduleTimes>,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
) -> DerivedMetrics {
    let Some(schedule) = schedule else {
        return DerivedMetrics::default();
    };

    let mut metrics = DerivedMetrics::default();

    if let (Some(expected), Some(actual)) = (schedule.time_in, time_in) {
        // Early arrival clamps to zero, never negative lateness.
        metrics.late_minutes = Some(minutes_between(expected, actual).max(0));
    }

    if let (Some(expected), Some(actual)) = (schedule.time_out, time_out) {
        // One signed difference, clamped both ways: at most one of the
        // two is non-zero.
        let diff = minutes_between(expected, actual);
        metrics.undertime_minutes = Some((-diff).max(0));
        metrics.overtime_minutes = Some(diff.max(0));
    }

    // Absence only means something when the account was expected to show up.
    metrics.is_absent = Some(time_in.is_none() && time_out.is_none());

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn nine_to_six() -> ScheduleTimes {
        ScheduleTimes {
            time_in: Some(t(9, 0)),
            time_out: Some(t(18, 0)),
        }
    }

    #[test]
    fn no_schedule_yields_all_nulls() {
        let metrics = derive_metrics(None, Some(t(9, 15)), Some(t(18, 0)));
        assert_eq!(metrics, DerivedMetrics::default());
    }

    #[test]
    fn late_arrival_counts_minutes() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(9, 15)), None);
        assert_eq!(metrics.late_minutes, Some(15));
    }

    #[test]
    fn early_arrival_clamps_to_zero() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(8, 50)), None);
        assert_eq!(metrics.late_minutes, Some(0));
    }

    #[test]
    fn early_departure_is_undertime_only() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(9, 0)), Some(t(17, 30)));
        assert_eq!(metrics.undertime_minutes, Some(30));
        assert_eq!(metrics.overtime_minutes, Some(0));
    }

    #[test]
    fn late_departure_is_overtime_only() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(9, 0)), Some(t(19, 0)));
        assert_eq!(metrics.undertime_minutes, Some(0));
        assert_eq!(metrics.overtime_minutes, Some(60));
    }

    #[test]
    fn on_time_departure_zeroes_both() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(9, 0)), Some(t(18, 0)));
        assert_eq!(metrics.undertime_minutes, Some(0));
        assert_eq!(metrics.overtime_minutes, Some(0));
    }

    #[test]
    fn absent_when_scheduled_with_no_punches() {
        let metrics = derive_metrics(Some(&nine_to_six()), None, None);
        assert_eq!(metrics.is_absent, Some(true));
        assert_eq!(metrics.late_minutes, None);
        assert_eq!(metrics.undertime_minutes, None);
    }

    #[test]
    fn present_with_a_single_punch() {
        let metrics = derive_metrics(Some(&nine_to_six()), Some(t(9, 0)), None);
        assert_eq!(metrics.is_absent, Some(false));
    }

    #[test]
    fn schedule_without_times_still_marks_presence() {
        let schedule = ScheduleTimes {
            time_in: None,
            time_out: None,
        };
        let metrics = derive_metrics(Some(&schedule), None, None);
        assert_eq!(metrics.is_absent, Some(true));
        assert_eq!(metrics.late_minutes, None);
        assert_eq!(metrics.overtime_minutes, None);
    }
}
