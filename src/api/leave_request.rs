use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::leave::{
    LeaveStatus, enforce_advance_notice, ranges_overlap, validate_date_order,
};
use crate::error::{ApiError, db_error, internal};
use crate::model::leave_request::LeaveRequest;

const LEAVE_COLUMNS: &str = "id, account_id, branch_id, start_date, end_date, reason, status, \
     rejection_reason, requested_at, reviewed_at, reviewed_by_id";

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Defaults to the caller's own account; only privileged users may file
    /// for someone else
    #[schema(example = 1001)]
    pub account_id: Option<u64>,
    #[schema(example = 1)]
    pub branch_id: Option<u64>,
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    pub branch_id: Option<u64>,
    #[schema(format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    #[schema(example = "APPROVED")]
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by account (privileged callers only)
    pub account_id: Option<u64>,
    /// Filter by branch
    pub branch_id: Option<u64>,
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Requests overlapping [start_date, end_date]
    #[schema(format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(NaiveDate),
}

fn parse_status(raw: &str) -> Result<LeaveStatus, ApiError> {
    LeaveStatus::from_str(raw).map_err(|_| {
        ApiError::Validation("status must be one of PENDING, APPROVED, REJECTED".into())
    })
}

async fn fetch_leave(pool: &MySqlPool, id: u64) -> Result<LeaveRequest, ApiError> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Leave request", id))
}

/// Conflict when an APPROVED leave of the same account shares at least one
/// day with [start, end]. `exclude_id` skips the record being updated.
async fn ensure_no_overlap(
    pool: &MySqlPool,
    account_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<u64>,
) -> Result<(), ApiError> {
    let approved: Vec<(u64, NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"
        SELECT id, start_date, end_date
        FROM leave_requests
        WHERE account_id = ? AND status = 'APPROVED'
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .map_err(internal)?;

    let conflicting = approved
        .iter()
        .filter(|(id, _, _)| Some(*id) != exclude_id)
        .any(|(_, s, e)| ranges_overlap(*s, *e, start, end));

    if conflicting {
        return Err(ApiError::Conflict(
            "Approved leave already exists for the overlapping dates".into(),
        ));
    }
    Ok(())
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, body = LeaveRequest),
        (status = 400, description = "Inverted dates or too little advance notice"),
        (status = 403),
        (status = 409, description = "Overlaps an approved leave")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let account_id = match payload.account_id {
        Some(id) if auth.is_privileged() || auth.account_id == Some(id) => id,
        Some(_) => {
            return Err(ApiError::Forbidden(
                "Not allowed to file leave for another account".into(),
            ));
        }
        None => auth.require_account()?,
    };

    let now = Utc::now();

    validate_date_order(payload.start_date, payload.end_date)?;
    enforce_advance_notice(now.date_naive(), payload.start_date)?;
    ensure_no_overlap(
        pool.get_ref(),
        account_id,
        payload.start_date,
        payload.end_date,
        None,
    )
    .await?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (account_id, branch_id, start_date, end_date, reason, status, requested_at)
        VALUES (?, ?, ?, ?, ?, 'PENDING', ?)
        "#,
    )
    .bind(account_id)
    .bind(payload.branch_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Duplicate leave request", "Related account or branch not found"))?;

    let leave = fetch_leave(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses((status = 200, body = [LeaveRequest]), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    // Non-privileged callers only ever see their own requests.
    if auth.is_privileged() {
        if let Some(account_id) = query.account_id {
            where_sql.push_str(" AND account_id = ?");
            args.push(FilterValue::U64(account_id));
        }
    } else {
        where_sql.push_str(" AND account_id = ?");
        args.push(FilterValue::U64(auth.require_account()?));
    }

    if let Some(branch_id) = query.branch_id {
        where_sql.push_str(" AND branch_id = ?");
        args.push(FilterValue::U64(branch_id));
    }

    if let Some(status) = query.status.as_deref() {
        parse_status(status)?;
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // Range filter selects requests overlapping the window.
    if let Some(end) = query.end_date {
        where_sql.push_str(" AND start_date <= ?");
        args.push(FilterValue::Date(end));
    }
    if let Some(start) = query.start_date {
        where_sql.push_str(" AND end_date >= ?");
        args.push(FilterValue::Date(start));
    }

    let data_sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests{} ORDER BY start_date DESC",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s.to_string()),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let leaves = data_q.fetch_all(pool.get_ref()).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/{id}",
    params(("id", description = "Leave request ID")),
    responses((status = 200, body = LeaveRequest), (status = 403), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave = fetch_leave(pool.get_ref(), path.into_inner()).await?;

    if !auth.is_privileged() && auth.account_id != Some(leave.account_id) {
        return Err(ApiError::Forbidden(
            "Not allowed to view this leave request".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Update / review leave request
========================= */
/// Owners may edit their still-pending requests; privileged users may edit
/// anything. Approving re-runs the overlap check; rejecting requires a
/// reason; both stamp the reviewer.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}",
    request_body = UpdateLeave,
    params(("id", description = "Leave request ID")),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Invalid dates, status or missing rejection reason"),
        (status = 403),
        (status = 404),
        (status = 409, description = "Overlaps an approved leave")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateLeave>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = fetch_leave(pool.get_ref(), id).await?;

    let is_privileged = auth.is_privileged();
    let is_owner = auth.account_id == Some(existing.account_id);

    if !is_privileged && !is_owner {
        return Err(ApiError::Forbidden(
            "Not allowed to update this leave request".into(),
        ));
    }

    let current_status = parse_status(&existing.status).map_err(|_| {
        tracing::error!(leave_id = id, status = %existing.status, "Corrupt leave status");
        ApiError::Internal
    })?;

    // Normal employees can only edit pending requests.
    if !is_privileged && current_status != LeaveStatus::Pending {
        return Err(ApiError::Forbidden(
            "Only pending requests can be edited".into(),
        ));
    }

    let start = body.start_date.unwrap_or(existing.start_date);
    let end = body.end_date.unwrap_or(existing.end_date);
    validate_date_order(start, end)?;

    let next_status = match &body.status {
        Some(raw) => parse_status(raw)?,
        None => current_status,
    };

    let status_changed = next_status != current_status;
    if status_changed {
        if !current_status.can_transition_to(next_status) {
            return Err(ApiError::Forbidden(
                "Leave request has already been finalized".into(),
            ));
        }
        if next_status == LeaveStatus::Rejected && body.rejection_reason.is_none() {
            return Err(ApiError::Validation(
                "rejection_reason is required when rejecting".into(),
            ));
        }
    }

    // Anything that ends up APPROVED must still be conflict-free.
    if next_status == LeaveStatus::Approved {
        ensure_no_overlap(pool.get_ref(), existing.account_id, start, end, Some(id)).await?;
    }

    let (reviewed_at, reviewed_by_id) = if status_changed {
        (Some(Utc::now()), Some(auth.user_id))
    } else {
        (existing.reviewed_at, existing.reviewed_by_id)
    };

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET branch_id = ?, start_date = ?, end_date = ?, reason = ?, status = ?,
            rejection_reason = ?, reviewed_at = ?, reviewed_by_id = ?
        WHERE id = ?
        "#,
    )
    .bind(body.branch_id.or(existing.branch_id))
    .bind(start)
    .bind(end)
    .bind(body.reason.as_ref().unwrap_or(&existing.reason))
    .bind(next_status.to_string())
    .bind(body.rejection_reason.as_ref().or(existing.rejection_reason.as_ref()))
    .bind(reviewed_at)
    .bind(reviewed_by_id)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Duplicate leave request", "Related account or branch not found"))?;

    let leave = fetch_leave(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leave/{id}",
    params(("id", description = "Leave request ID")),
    responses((status = 200), (status = 403), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Leave request", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
