use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregated pay figures for one account in one period;
/// unique per (period, account).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollItem {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub period_id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = 2500.0)]
    pub gross_pay: f64,

    #[schema(example = 2200.0)]
    pub net_pay: f64,

    #[schema(example = 5)]
    pub total_days: i64,

    #[schema(example = 60)]
    pub total_overtime: i64,

    #[schema(example = 15)]
    pub total_late: i64,

    #[schema(example = 0)]
    pub total_undertime: i64,

    #[schema(example = 300.0)]
    pub deductions: f64,

    #[schema(example = 0.0)]
    pub allowances: f64,

    #[schema(example = "PENDING")]
    pub status: String,

    #[schema(example = "2026-08-16T00:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-08-20T00:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub released_at: Option<DateTime<Utc>>,
}
