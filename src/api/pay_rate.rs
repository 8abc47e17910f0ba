use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::payroll::RateType;
use crate::error::{ApiError, db_error, internal};
use crate::model::pay_rate::PayRate;

const PAY_RATE_COLUMNS: &str = "id, account_id, rate_type, base_rate, overtime_rate";

#[derive(Deserialize, ToSchema)]
pub struct CreatePayRate {
    #[schema(example = 1001)]
    pub account_id: u64,
    #[schema(example = "DAILY")]
    pub rate_type: String,
    #[schema(example = 500.0)]
    pub base_rate: f64,
    #[schema(example = 75.0)]
    pub overtime_rate: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayRate {
    pub rate_type: Option<String>,
    pub base_rate: Option<f64>,
    pub overtime_rate: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayRateQuery {
    pub account_id: Option<u64>,
}

fn parse_rate_type(raw: &str) -> Result<RateType, ApiError> {
    RateType::from_str(raw).map_err(|_| {
        ApiError::Validation("rate_type must be one of HOURLY, DAILY, MONTHLY".into())
    })
}

fn validate_amounts(base_rate: f64, overtime_rate: Option<f64>) -> Result<(), ApiError> {
    if base_rate < 0.0 || overtime_rate.is_some_and(|r| r < 0.0) {
        return Err(ApiError::Validation("Rates must not be negative".into()));
    }
    Ok(())
}

async fn fetch_pay_rate(pool: &MySqlPool, id: u64) -> Result<PayRate, ApiError> {
    sqlx::query_as::<_, PayRate>(&format!(
        "SELECT {PAY_RATE_COLUMNS} FROM pay_rates WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Pay rate", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/pay-rates",
    request_body = CreatePayRate,
    responses(
        (status = 201, body = PayRate),
        (status = 404, description = "Account not found"),
        (status = 409, description = "A pay rate for this account already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "PayRates"
)]
pub async fn create_pay_rate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayRate>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let rate_type = parse_rate_type(&payload.rate_type)?;
    validate_amounts(payload.base_rate, payload.overtime_rate)?;

    let result = sqlx::query(
        r#"
        INSERT INTO pay_rates (account_id, rate_type, base_rate, overtime_rate)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.account_id)
    .bind(rate_type.to_string())
    .bind(payload.base_rate)
    .bind(payload.overtime_rate)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        db_error(
            e,
            "A pay rate for this account already exists",
            "Related account not found",
        )
    })?;

    let rate = fetch_pay_rate(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(rate))
}

#[utoipa::path(
    get,
    path = "/api/v1/pay-rates",
    params(PayRateQuery),
    responses((status = 200, body = [PayRate])),
    security(("bearer_auth" = [])),
    tag = "PayRates"
)]
pub async fn list_pay_rates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayRateQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let mut sql = format!("SELECT {PAY_RATE_COLUMNS} FROM pay_rates");
    if query.account_id.is_some() {
        sql.push_str(" WHERE account_id = ?");
    }
    sql.push_str(" ORDER BY id DESC");

    let mut q = sqlx::query_as::<_, PayRate>(&sql);
    if let Some(account_id) = query.account_id {
        q = q.bind(account_id);
    }

    let rates = q.fetch_all(pool.get_ref()).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(rates))
}

#[utoipa::path(
    get,
    path = "/api/v1/pay-rates/{id}",
    params(("id", description = "Pay rate ID")),
    responses((status = 200, body = PayRate), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "PayRates"
)]
pub async fn get_pay_rate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let rate = fetch_pay_rate(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rate))
}

#[utoipa::path(
    put,
    path = "/api/v1/pay-rates/{id}",
    request_body = UpdatePayRate,
    params(("id", description = "Pay rate ID")),
    responses((status = 200, body = PayRate), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "PayRates"
)]
pub async fn update_pay_rate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayRate>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_pay_rate(pool.get_ref(), id).await?;

    let rate_type = match &body.rate_type {
        Some(raw) => parse_rate_type(raw)?,
        None => parse_rate_type(&current.rate_type)?,
    };
    let base_rate = body.base_rate.unwrap_or(current.base_rate);
    let overtime_rate = body.overtime_rate.or(current.overtime_rate);
    validate_amounts(base_rate, overtime_rate)?;

    sqlx::query(
        r#"
        UPDATE pay_rates
        SET rate_type = ?, base_rate = ?, overtime_rate = ?
        WHERE id = ?
        "#,
    )
    .bind(rate_type.to_string())
    .bind(base_rate)
    .bind(overtime_rate)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    let rate = fetch_pay_rate(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(rate))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pay-rates/{id}",
    params(("id", description = "Pay rate ID")),
    responses((status = 200), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "PayRates"
)]
pub async fn delete_pay_rate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM pay_rates WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Pay rate", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
