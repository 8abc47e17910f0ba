use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Branch {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "HQ")]
    pub code: String,

    #[schema(example = "Head Office")]
    pub name: String,

    #[schema(example = "123 Main St, Metro City", nullable = true)]
    pub address: Option<String>,

    pub is_active: bool,
}
