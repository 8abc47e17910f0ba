use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, db_error, internal};
use crate::model::account::Account;
use crate::utils::db_utils::{build_update_sql, execute_update};

const ACCOUNT_COLUMNS: &str =
    "id, code, first_name, last_name, email, phone, branch_id, date_hired, is_active";

/// Columns a partial update may touch.
const UPDATABLE: &[&str] = &[
    "code",
    "first_name",
    "last_name",
    "email",
    "phone",
    "branch_id",
    "date_hired",
    "is_active",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateAccount {
    #[schema(example = "EMP-001")]
    pub code: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+15550100")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub branch_id: Option<u64>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date_hired: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AccountQuery {
    /// Filter by branch
    pub branch_id: Option<u64>,
    /// Include deactivated accounts (default false)
    pub include_inactive: Option<bool>,
}

pub(crate) async fn fetch_account(pool: &MySqlPool, id: u64) -> Result<Account, ApiError> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Account", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, body = Account),
        (status = 404, description = "Branch not found"),
        (status = 409, description = "Account code or email must be unique")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn create_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAccount>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let result = sqlx::query(
        r#"
        INSERT INTO accounts
        (code, first_name, last_name, email, phone, branch_id, date_hired, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.branch_id)
    .bind(payload.date_hired)
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Account code or email must be unique", "Branch not found"))?;

    let account = fetch_account(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(account))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(AccountQuery),
    responses((status = 200, body = [Account])),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AccountQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let mut sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE 1=1");
    if !query.include_inactive.unwrap_or(false) {
        sql.push_str(" AND is_active = TRUE");
    }
    if query.branch_id.is_some() {
        sql.push_str(" AND branch_id = ?");
    }
    sql.push_str(" ORDER BY last_name, first_name");

    let mut q = sqlx::query_as::<_, Account>(&sql);
    if let Some(branch_id) = query.branch_id {
        q = q.bind(branch_id);
    }

    let accounts = q.fetch_all(pool.get_ref()).await.map_err(internal)?;

    Ok(HttpResponse::Ok().json(accounts))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id", description = "Account ID")),
    responses((status = 200, body = Account), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let account = fetch_account(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Partial update from a free-form JSON object, column allow-list enforced.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id", description = "Account ID")),
    responses((status = 200, body = Account), (status = 404), (status = 409)),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn update_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let update = build_update_sql("accounts", &body, UPDATABLE, "id", id)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| db_error(e, "Account code or email must be unique", "Branch not found"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Account", id));
    }

    let account = fetch_account(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Accounts are never hard-deleted; payroll history must keep resolving.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id", description = "Account ID")),
    responses((status = 200, description = "Account deactivated"), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn delete_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Account", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Account deactivated"
    })))
}
