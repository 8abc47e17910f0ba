use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = 1, nullable = true)]
    pub branch_id: Option<u64>,

    #[schema(example = "2026-08-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-08-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "Family trip")]
    pub reason: String,

    #[schema(example = "PENDING")]
    pub status: String,

    #[schema(example = "Coverage gap on those dates", nullable = true)]
    pub rejection_reason: Option<String>,

    #[schema(example = "2026-08-05T09:00:00Z", value_type = String, format = "date-time")]
    pub requested_at: DateTime<Utc>,

    #[schema(example = "2026-08-06T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[schema(example = 3, nullable = true)]
    pub reviewed_by_id: Option<u64>,
}
