use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Actual punches plus the metrics derived against the day's schedule.
/// Derived fields are null when no schedule exists for the date.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:15:00", value_type = String, nullable = true)]
    pub time_in: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub time_out: Option<NaiveTime>,

    #[schema(example = 15, nullable = true)]
    pub late_minutes: Option<i64>,

    #[schema(example = 0, nullable = true)]
    pub undertime_minutes: Option<i64>,

    #[schema(example = 0, nullable = true)]
    pub overtime_minutes: Option<i64>,

    #[schema(example = false, nullable = true)]
    pub is_absent: Option<bool>,
}
