use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::attendance::{DerivedMetrics, ScheduleTimes, derive_metrics};
use crate::error::{ApiError, db_error, internal};
use crate::model::attendance::Attendance;

const ATTENDANCE_COLUMNS: &str = "id, account_id, date, time_in, time_out, \
     late_minutes, undertime_minutes, overtime_minutes, is_absent";

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = 1001)]
    pub account_id: u64,
    #[schema(example = "2026-08-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:15:00", value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String)]
    pub time_out: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    pub account_id: Option<u64>,
    #[schema(format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(value_type = String)]
    pub time_out: Option<NaiveTime>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    pub account_id: Option<u64>,
    /// Exact date; takes precedence over the range bounds
    #[schema(format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

async fn fetch_attendance(pool: &MySqlPool, id: u64) -> Result<Attendance, ApiError> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Attendance", id))
}

/// Look up the day's schedule and derive the attendance metrics against it.
async fn derived_for(
    pool: &MySqlPool,
    account_id: u64,
    date: NaiveDate,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
) -> Result<DerivedMetrics, ApiError> {
    let schedule = sqlx::query_as::<_, (Option<NaiveTime>, Option<NaiveTime>)>(
        "SELECT time_in, time_out FROM schedules WHERE account_id = ? AND date = ?",
    )
    .bind(account_id)
    .bind(date)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .map(|(time_in, time_out)| ScheduleTimes { time_in, time_out });

    Ok(derive_metrics(schedule.as_ref(), time_in, time_out))
}

/// Create or overwrite the punch record for (account, date). Derived fields
/// are recomputed from the schedule on every write.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 200, body = Attendance),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let derived = derived_for(
        pool.get_ref(),
        payload.account_id,
        payload.date,
        payload.time_in,
        payload.time_out,
    )
    .await?;

    sqlx::query(
        r#"
        INSERT INTO attendance
            (account_id, date, time_in, time_out,
             late_minutes, undertime_minutes, overtime_minutes, is_absent)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            time_in = VALUES(time_in),
            time_out = VALUES(time_out),
            late_minutes = VALUES(late_minutes),
            undertime_minutes = VALUES(undertime_minutes),
            overtime_minutes = VALUES(overtime_minutes),
            is_absent = VALUES(is_absent)
        "#,
    )
    .bind(payload.account_id)
    .bind(payload.date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(derived.late_minutes)
    .bind(derived.undertime_minutes)
    .bind(derived.overtime_minutes)
    .bind(derived.is_absent)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        db_error(
            e,
            "Attendance for this account and date already exists",
            "Related account not found",
        )
    })?;

    let row = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE account_id = ? AND date = ?"
    ))
    .bind(payload.account_id)
    .bind(payload.date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal)?;

    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses((status = 200, body = [Attendance])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    // Employees may inspect their own history; everyone else needs the
    // privileged tier.
    let own_account = auth.account_id;
    let account_filter = match query.account_id {
        Some(id) if auth.is_privileged() => Some(id),
        Some(id) if own_account == Some(id) => Some(id),
        Some(_) => return Err(ApiError::Forbidden("Not allowed to view this account".into())),
        None if auth.is_privileged() => None,
        None => Some(auth.require_account()?),
    };

    let mut sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE 1=1");
    if account_filter.is_some() {
        sql.push_str(" AND account_id = ?");
    }
    if query.date.is_some() {
        sql.push_str(" AND date = ?");
    } else {
        if query.start_date.is_some() {
            sql.push_str(" AND date >= ?");
        }
        if query.end_date.is_some() {
            sql.push_str(" AND date <= ?");
        }
    }
    sql.push_str(" ORDER BY date DESC");

    let mut q = sqlx::query_as::<_, Attendance>(&sql);
    if let Some(account_id) = account_filter {
        q = q.bind(account_id);
    }
    if let Some(date) = query.date {
        q = q.bind(date);
    } else {
        if let Some(start) = query.start_date {
            q = q.bind(start);
        }
        if let Some(end) = query.end_date {
            q = q.bind(end);
        }
    }

    let rows = q.fetch_all(pool.get_ref()).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/{id}",
    params(("id", description = "Attendance ID")),
    responses((status = 200, body = Attendance), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let row = fetch_attendance(pool.get_ref(), path.into_inner()).await?;

    if !auth.is_privileged() && auth.account_id != Some(row.account_id) {
        return Err(ApiError::Forbidden("Not allowed to view this record".into()));
    }

    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    put,
    path = "/api/v1/attendance/{id}",
    request_body = UpdateAttendance,
    params(("id", description = "Attendance ID")),
    responses(
        (status = 200, body = Attendance),
        (status = 404),
        (status = 409, description = "Attendance for this account and date already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateAttendance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let existing = fetch_attendance(pool.get_ref(), id).await?;

    // Absent fields keep their stored values; punches cannot be cleared
    // through this endpoint.
    let account_id = body.account_id.unwrap_or(existing.account_id);
    let date = body.date.unwrap_or(existing.date);
    let time_in = body.time_in.or(existing.time_in);
    let time_out = body.time_out.or(existing.time_out);

    let derived = derived_for(pool.get_ref(), account_id, date, time_in, time_out).await?;

    sqlx::query(
        r#"
        UPDATE attendance
        SET account_id = ?, date = ?, time_in = ?, time_out = ?,
            late_minutes = ?, undertime_minutes = ?, overtime_minutes = ?, is_absent = ?
        WHERE id = ?
        "#,
    )
    .bind(account_id)
    .bind(date)
    .bind(time_in)
    .bind(time_out)
    .bind(derived.late_minutes)
    .bind(derived.undertime_minutes)
    .bind(derived.overtime_minutes)
    .bind(derived.is_absent)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        db_error(
            e,
            "Attendance for this account and date already exists",
            "Related account not found",
        )
    })?;

    let row = fetch_attendance(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{id}",
    params(("id", description = "Attendance ID")),
    responses((status = 200), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Attendance", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
