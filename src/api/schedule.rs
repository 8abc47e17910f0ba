use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, db_error, internal};
use crate::model::schedule::Schedule;

const SCHEDULE_COLUMNS: &str = "id, account_id, date, time_in, time_out";

#[derive(Deserialize, ToSchema)]
pub struct CreateSchedule {
    #[schema(example = 1001)]
    pub account_id: u64,
    #[schema(example = "2026-08-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub time_out: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSchedule {
    #[schema(example = "09:00:00", value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub time_out: Option<NaiveTime>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ScheduleQuery {
    pub account_id: Option<u64>,
    #[schema(format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

async fn fetch_schedule(pool: &MySqlPool, id: u64) -> Result<Schedule, ApiError> {
    sqlx::query_as::<_, Schedule>(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Schedule", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    request_body = CreateSchedule,
    responses(
        (status = 201, body = Schedule),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Schedule for this account and date already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn create_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSchedule>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let result = sqlx::query(
        r#"
        INSERT INTO schedules (account_id, date, time_in, time_out)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.account_id)
    .bind(payload.date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        db_error(
            e,
            "Schedule for this account and date already exists",
            "Related account not found",
        )
    })?;

    let schedule = fetch_schedule(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(schedule))
}

#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    params(ScheduleQuery),
    responses((status = 200, body = [Schedule])),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn list_schedules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ScheduleQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let mut sql = format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE 1=1");
    if query.account_id.is_some() {
        sql.push_str(" AND account_id = ?");
    }
    if query.start_date.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if query.end_date.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut q = sqlx::query_as::<_, Schedule>(&sql);
    if let Some(account_id) = query.account_id {
        q = q.bind(account_id);
    }
    if let Some(start) = query.start_date {
        q = q.bind(start);
    }
    if let Some(end) = query.end_date {
        q = q.bind(end);
    }

    let schedules = q.fetch_all(pool.get_ref()).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(schedules))
}

#[utoipa::path(
    get,
    path = "/api/v1/schedules/{id}",
    params(("id", description = "Schedule ID")),
    responses((status = 200, body = Schedule), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn get_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let schedule = fetch_schedule(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(schedule))
}

#[utoipa::path(
    put,
    path = "/api/v1/schedules/{id}",
    request_body = UpdateSchedule,
    params(("id", description = "Schedule ID")),
    responses((status = 200, body = Schedule), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn update_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateSchedule>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_schedule(pool.get_ref(), id).await?;

    sqlx::query("UPDATE schedules SET time_in = ?, time_out = ? WHERE id = ?")
        .bind(body.time_in.or(current.time_in))
        .bind(body.time_out.or(current.time_out))
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    let schedule = fetch_schedule(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(schedule))
}

#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{id}",
    params(("id", description = "Schedule ID")),
    responses((status = 200), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Schedule", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
