use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, internal};
use crate::model::payroll_period::PayrollPeriod;

const PERIOD_COLUMNS: &str = "id, name, start_date, end_date, is_locked";

#[derive(Deserialize, ToSchema)]
pub struct CreatePayrollPeriod {
    #[schema(example = "August 2026, first half")]
    pub name: String,
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub is_locked: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollPeriod {
    pub name: Option<String>,
    #[schema(format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
    pub is_locked: Option<bool>,
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::Validation(
            "start_date must be before or equal to end_date".into(),
        ));
    }
    Ok(())
}

pub(crate) async fn fetch_period(pool: &MySqlPool, id: u64) -> Result<PayrollPeriod, ApiError> {
    sqlx::query_as::<_, PayrollPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM payroll_periods WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Payroll period", id))
}

/// The lock gate shared by every payroll-item mutation.
pub(crate) async fn ensure_period_unlocked(pool: &MySqlPool, id: u64) -> Result<PayrollPeriod, ApiError> {
    let period = fetch_period(pool, id).await?;
    if period.is_locked {
        return Err(ApiError::Forbidden("Payroll period is locked".into()));
    }
    Ok(period)
}

#[utoipa::path(
    post,
    path = "/api/v1/payroll-periods",
    request_body = CreatePayrollPeriod,
    responses((status = 201, body = PayrollPeriod), (status = 400)),
    security(("bearer_auth" = [])),
    tag = "PayrollPeriods"
)]
pub async fn create_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayrollPeriod>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    validate_dates(payload.start_date, payload.end_date)?;

    let result = sqlx::query(
        r#"
        INSERT INTO payroll_periods (name, start_date, end_date, is_locked)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.is_locked.unwrap_or(false))
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    let period = fetch_period(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(period))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll-periods",
    responses((status = 200, body = [PayrollPeriod])),
    security(("bearer_auth" = [])),
    tag = "PayrollPeriods"
)]
pub async fn list_periods(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let periods = sqlx::query_as::<_, PayrollPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM payroll_periods ORDER BY start_date DESC"
    ))
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    Ok(HttpResponse::Ok().json(periods))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll-periods/{id}",
    params(("id", description = "Payroll period ID")),
    responses((status = 200, body = PayrollPeriod), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "PayrollPeriods"
)]
pub async fn get_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let period = fetch_period(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(period))
}

#[utoipa::path(
    put,
    path = "/api/v1/payroll-periods/{id}",
    request_body = UpdatePayrollPeriod,
    params(("id", description = "Payroll period ID")),
    responses((status = 200, body = PayrollPeriod), (status = 400), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "PayrollPeriods"
)]
pub async fn update_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayrollPeriod>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_period(pool.get_ref(), id).await?;

    let start = body.start_date.unwrap_or(current.start_date);
    let end = body.end_date.unwrap_or(current.end_date);
    validate_dates(start, end)?;

    sqlx::query(
        r#"
        UPDATE payroll_periods
        SET name = ?, start_date = ?, end_date = ?, is_locked = ?
        WHERE id = ?
        "#,
    )
    .bind(body.name.as_ref().unwrap_or(&current.name))
    .bind(start)
    .bind(end)
    .bind(body.is_locked.unwrap_or(current.is_locked))
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    let period = fetch_period(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(period))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payroll-periods/{id}",
    params(("id", description = "Payroll period ID")),
    responses(
        (status = 200),
        (status = 404),
        (status = 409, description = "Period still has payroll items")
    ),
    security(("bearer_auth" = [])),
    tag = "PayrollPeriods"
)]
pub async fn delete_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    fetch_period(pool.get_ref(), id).await?;

    let items: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM payroll_items WHERE period_id = ?")
            .bind(id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(internal)?;

    if items > 0 {
        return Err(ApiError::Conflict(
            "Cannot delete payroll period with existing payroll items".into(),
        ));
    }

    sqlx::query("DELETE FROM payroll_periods WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
