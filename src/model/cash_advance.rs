use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An employee loan consumed by a later payroll run. Immutable once
/// deducted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CashAdvance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = 300.0)]
    pub amount: f64,

    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub date_granted: NaiveDate,

    pub is_deducted: bool,

    #[schema(example = "2026-08-15T00:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub deducted_at: Option<DateTime<Utc>>,
}
