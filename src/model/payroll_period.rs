use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Administrative date range aggregated into one payroll item per account.
/// Locking blocks any further item creation or mutation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollPeriod {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "August 2026, first half")]
    pub name: String,

    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-08-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    pub is_locked: bool,
}
