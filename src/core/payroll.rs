use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How an account's base rate is interpreted when aggregating a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RateType {
    Hourly,
    Daily,
    Monthly,
}

/// Lifecycle of a payroll item. Advanced externally; generation only ever
/// sets PENDING on first insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PayStatus {
    Pending,
    Approved,
    Released,
}

pub struct PayRateInfo {
    pub rate_type: RateType,
    pub base_rate: f64,
    pub overtime_rate: Option<f64>,
}

impl PayRateInfo {
    /// Overtime falls back to the base rate when no dedicated rate is set.
    pub fn effective_overtime_rate(&self) -> f64 {
        self.overtime_rate.unwrap_or(self.base_rate)
    }
}

/// One attendance row as the generator sees it.
pub struct AttendanceDay {
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub late_minutes: Option<i64>,
    pub undertime_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub is_absent: Option<bool>,
}

#[derive(Debug, Default, PartialEq)]
pub struct PayrollTotals {
    pub total_days: i64,
    pub total_late: i64,
    pub total_undertime: i64,
    pub total_overtime: i64,
    pub worked_minutes: i64,
    pub gross_pay: f64,
    pub deductions: f64,
    pub allowances: f64,
    pub net_pay: f64,
}

/// Aggregate one account's attendance and undeducted cash advances into the
/// figures for its payroll item.
///
/// A missing pay rate pays nothing rather than failing the account. Overtime
/// pay is additive on top of every rate type, including MONTHLY.
pub fn compute_totals(
    rate: Option<&PayRateInfo>,
    days: &[AttendanceDay],
    advances: &[f64],
) -> PayrollTotals {
    let total_days = days.iter().filter(|d| d.is_absent == Some(false)).count() as i64;
    let total_late: i64 = days.iter().filter_map(|d| d.late_minutes).sum();
    let total_undertime: i64 = days.iter().filter_map(|d| d.undertime_minutes).sum();
    let total_overtime: i64 = days.iter().filter_map(|d| d.overtime_minutes).sum();

    let worked_minutes: i64 = days
        .iter()
        .filter_map(|d| match (d.time_in, d.time_out) {
            (Some(time_in), Some(time_out)) => Some((time_out - time_in).num_minutes()),
            _ => None,
        })
        .sum();

    let base_pay = match rate {
        None => 0.0,
        Some(rate) => match rate.rate_type {
            RateType::Daily => rate.base_rate * total_days as f64,
            RateType::Hourly => rate.base_rate * (worked_minutes as f64 / 60.0),
            // Flat for the period, independent of attendance.
            RateType::Monthly => rate.base_rate,
        },
    };

    let overtime_pay = match rate {
        None => 0.0,
        Some(rate) => (total_overtime as f64 / 60.0) * rate.effective_overtime_rate(),
    };

    let gross_pay = base_pay + overtime_pay;
    let deductions: f64 = advances.iter().sum();
    // Late/undertime are tracked in minutes only; converting them to money
    // is deliberately not implemented.
    let allowances = 0.0;

    PayrollTotals {
        total_days,
        total_late,
        total_undertime,
        total_overtime,
        worked_minutes,
        gross_pay,
        deductions,
        allowances,
        net_pay: gross_pay - deductions + allowances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn worked_day(minutes: i64) -> AttendanceDay {
        AttendanceDay {
            time_in: Some(t(9, 0)),
            time_out: Some(t(9, 0) + chrono::Duration::minutes(minutes)),
            late_minutes: Some(0),
            undertime_minutes: Some(0),
            overtime_minutes: Some(0),
            is_absent: Some(false),
        }
    }

    fn absent_day() -> AttendanceDay {
        AttendanceDay {
            time_in: None,
            time_out: None,
            late_minutes: None,
            undertime_minutes: None,
            overtime_minutes: None,
            is_absent: Some(true),
        }
    }

    fn daily(base: f64) -> PayRateInfo {
        PayRateInfo {
            rate_type: RateType::Daily,
            base_rate: base,
            overtime_rate: None,
        }
    }

    #[test]
    fn daily_rate_pays_per_worked_day() {
        let days: Vec<_> = (0..5).map(|_| worked_day(480)).collect();
        let totals = compute_totals(Some(&daily(500.0)), &days, &[]);

        assert_eq!(totals.total_days, 5);
        assert_eq!(totals.gross_pay, 2500.0);
        assert_eq!(totals.net_pay, 2500.0);
    }

    #[test]
    fn absent_days_do_not_pay_daily_rate() {
        let days = vec![worked_day(480), absent_day(), worked_day(480)];
        let totals = compute_totals(Some(&daily(500.0)), &days, &[]);

        assert_eq!(totals.total_days, 2);
        assert_eq!(totals.gross_pay, 1000.0);
    }

    #[test]
    fn hourly_rate_pays_worked_minutes() {
        let rate = PayRateInfo {
            rate_type: RateType::Hourly,
            base_rate: 100.0,
            overtime_rate: None,
        };
        let days = vec![worked_day(480), worked_day(480)];
        let totals = compute_totals(Some(&rate), &days, &[]);

        assert_eq!(totals.worked_minutes, 960);
        assert_eq!(totals.gross_pay, 1600.0);
    }

    #[test]
    fn monthly_rate_is_flat_regardless_of_attendance() {
        let rate = PayRateInfo {
            rate_type: RateType::Monthly,
            base_rate: 30_000.0,
            overtime_rate: None,
        };
        let totals = compute_totals(Some(&rate), &[absent_day()], &[]);
        assert_eq!(totals.gross_pay, 30_000.0);
    }

    #[test]
    fn overtime_is_additive_on_monthly_rate() {
        let rate = PayRateInfo {
            rate_type: RateType::Monthly,
            base_rate: 30_000.0,
            overtime_rate: Some(200.0),
        };
        let mut day = worked_day(540);
        day.overtime_minutes = Some(60);
        let totals = compute_totals(Some(&rate), &[day], &[]);

        assert_eq!(totals.total_overtime, 60);
        assert_eq!(totals.gross_pay, 30_200.0);
    }

    #[test]
    fn overtime_rate_defaults_to_base_rate() {
        let mut day = worked_day(510);
        day.overtime_minutes = Some(30);
        let totals = compute_totals(Some(&daily(500.0)), &[day], &[]);

        // One worked day plus half an hour at the base rate.
        assert_eq!(totals.gross_pay, 500.0 + 250.0);
    }

    #[test]
    fn missing_pay_rate_pays_nothing() {
        let totals = compute_totals(None, &[worked_day(480)], &[]);
        assert_eq!(totals.gross_pay, 0.0);
        assert_eq!(totals.net_pay, 0.0);
        assert_eq!(totals.total_days, 1);
    }

    #[test]
    fn cash_advances_come_out_of_net_pay() {
        let days = vec![worked_day(480), worked_day(480)];
        let totals = compute_totals(Some(&daily(500.0)), &days, &[300.0, 150.0]);

        assert_eq!(totals.gross_pay, 1000.0);
        assert_eq!(totals.deductions, 450.0);
        assert_eq!(totals.net_pay, 550.0);
    }

    #[test]
    fn unscheduled_days_count_no_attendance_day() {
        // No schedule that day: is_absent is unknown, so the row neither
        // counts as worked nor as absent for the daily rate.
        let day = AttendanceDay {
            time_in: Some(t(9, 0)),
            time_out: Some(t(17, 0)),
            late_minutes: None,
            undertime_minutes: None,
            overtime_minutes: None,
            is_absent: None,
        };
        let totals = compute_totals(Some(&daily(500.0)), &[day], &[]);
        assert_eq!(totals.total_days, 0);
        // The worked minutes still accrue for hourly accounts.
        assert_eq!(totals.worked_minutes, 480);
    }

    #[test]
    fn rate_type_round_trips_through_strings() {
        assert_eq!(RateType::Hourly.to_string(), "HOURLY");
        assert_eq!(RateType::from_str("DAILY").unwrap(), RateType::Daily);
        assert!(RateType::from_str("WEEKLY").is_err());
    }

    #[test]
    fn pay_status_round_trips_through_strings() {
        assert_eq!(PayStatus::Pending.to_string(), "PENDING");
        assert_eq!(PayStatus::from_str("RELEASED").unwrap(), PayStatus::Released);
    }
}
