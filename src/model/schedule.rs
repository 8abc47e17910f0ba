use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Expected working hours for an account on a date. At most one row per
/// (account, date).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Schedule {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub time_in: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub time_out: Option<NaiveTime>,
}
