use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+15550100",
        "branch_id": 1,
        "date_hired": "2024-01-01",
        "is_active": true
    })
)]
pub struct Account {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+15550100", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = 1, nullable = true)]
    pub branch_id: Option<u64>,

    #[schema(example = "2024-01-01", value_type = String, format = "date", nullable = true)]
    pub date_hired: Option<NaiveDate>,

    pub is_active: bool,
}
