use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One per account. `overtime_rate` falls back to `base_rate` when null.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayRate {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub account_id: u64,

    #[schema(example = "DAILY")]
    pub rate_type: String,

    #[schema(example = 500.0)]
    pub base_rate: f64,

    #[schema(example = 75.0, nullable = true)]
    pub overtime_rate: Option<f64>,
}
