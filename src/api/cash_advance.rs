use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, db_error, internal};
use crate::model::cash_advance::CashAdvance;

const ADVANCE_COLUMNS: &str = "id, account_id, amount, date_granted, is_deducted, deducted_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateCashAdvance {
    #[schema(example = 1001)]
    pub account_id: u64,
    #[schema(example = 300.0)]
    pub amount: f64,
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    pub date_granted: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateCashAdvance {
    pub amount: Option<f64>,
    #[schema(format = "date", value_type = String)]
    pub date_granted: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CashAdvanceQuery {
    pub account_id: Option<u64>,
    /// Only advances not yet consumed by a payroll run
    pub undeducted_only: Option<bool>,
}

async fn fetch_advance(pool: &MySqlPool, id: u64) -> Result<CashAdvance, ApiError> {
    sqlx::query_as::<_, CashAdvance>(&format!(
        "SELECT {ADVANCE_COLUMNS} FROM cash_advances WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Cash advance", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/cash-advances",
    request_body = CreateCashAdvance,
    responses(
        (status = 201, body = CashAdvance),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "CashAdvances"
)]
pub async fn create_cash_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCashAdvance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    if payload.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO cash_advances (account_id, amount, date_granted, is_deducted)
        VALUES (?, ?, ?, FALSE)
        "#,
    )
    .bind(payload.account_id)
    .bind(payload.amount)
    .bind(payload.date_granted)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Duplicate cash advance", "Related account not found"))?;

    let advance = fetch_advance(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(advance))
}

#[utoipa::path(
    get,
    path = "/api/v1/cash-advances",
    params(CashAdvanceQuery),
    responses((status = 200, body = [CashAdvance])),
    security(("bearer_auth" = [])),
    tag = "CashAdvances"
)]
pub async fn list_cash_advances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CashAdvanceQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let mut sql = format!("SELECT {ADVANCE_COLUMNS} FROM cash_advances WHERE 1=1");
    if query.account_id.is_some() {
        sql.push_str(" AND account_id = ?");
    }
    if query.undeducted_only.unwrap_or(false) {
        sql.push_str(" AND is_deducted = FALSE");
    }
    sql.push_str(" ORDER BY date_granted DESC");

    let mut q = sqlx::query_as::<_, CashAdvance>(&sql);
    if let Some(account_id) = query.account_id {
        q = q.bind(account_id);
    }

    let advances = q.fetch_all(pool.get_ref()).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(advances))
}

#[utoipa::path(
    get,
    path = "/api/v1/cash-advances/{id}",
    params(("id", description = "Cash advance ID")),
    responses((status = 200, body = CashAdvance), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "CashAdvances"
)]
pub async fn get_cash_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let advance = fetch_advance(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(advance))
}

#[utoipa::path(
    put,
    path = "/api/v1/cash-advances/{id}",
    request_body = UpdateCashAdvance,
    params(("id", description = "Cash advance ID")),
    responses(
        (status = 200, body = CashAdvance),
        (status = 403, description = "Advance already deducted"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "CashAdvances"
)]
pub async fn update_cash_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateCashAdvance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_advance(pool.get_ref(), id).await?;

    // Consumed advances are frozen; rewriting one would double-count money
    // already paid out.
    if current.is_deducted {
        return Err(ApiError::Forbidden(
            "Cash advance has already been deducted".into(),
        ));
    }

    let amount = body.amount.unwrap_or(current.amount);
    if amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }

    sqlx::query("UPDATE cash_advances SET amount = ?, date_granted = ? WHERE id = ?")
        .bind(amount)
        .bind(body.date_granted.unwrap_or(current.date_granted))
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    let advance = fetch_advance(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(advance))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cash-advances/{id}",
    params(("id", description = "Cash advance ID")),
    responses(
        (status = 200),
        (status = 403, description = "Advance already deducted"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "CashAdvances"
)]
pub async fn delete_cash_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_advance(pool.get_ref(), id).await?;

    if current.is_deducted {
        return Err(ApiError::Forbidden(
            "Cash advance has already been deducted".into(),
        ));
    }

    sqlx::query("DELETE FROM cash_advances WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
