use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::error::{ApiError, db_error, internal};
use crate::utils::username_filter;

/// User as exposed over the API; the password hash never leaves the crate.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = 4)]
    pub role_id: u8,
    #[schema(example = 1001, nullable = true)]
    pub account_id: Option<u64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub role_id: Option<u8>,
    pub account_id: Option<u64>,
    /// Set to rotate the password
    pub password: Option<String>,
}

async fn fetch_user(pool: &MySqlPool, id: u64) -> Result<UserResponse, ApiError> {
    sqlx::query_as::<_, UserResponse>(
        "SELECT id, username, role_id, account_id, last_login_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("User", id))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses((status = 200, body = [UserResponse])),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let users = sqlx::query_as::<_, UserResponse>(
        "SELECT id, username, role_id, account_id, last_login_at FROM users ORDER BY username",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id", description = "User ID")),
    responses((status = 200, body = UserResponse), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let user = fetch_user(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UpdateUser,
    params(("id", description = "User ID")),
    responses((status = 200, body = UserResponse), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_user(pool.get_ref(), id).await?;

    if let Some(role_id) = body.role_id {
        if crate::model::role::Role::from_id(role_id).is_none() {
            return Err(ApiError::Validation("Invalid role".into()));
        }
    }

    let password_hash = match &body.password {
        Some(p) if !p.is_empty() => Some(hash_password(p).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::Internal
        })?),
        Some(_) => return Err(ApiError::Validation("Password must not be empty".into())),
        None => None,
    };

    let mut sql = String::from("UPDATE users SET role_id = ?, account_id = ?");
    if password_hash.is_some() {
        sql.push_str(", password = ?");
    }
    sql.push_str(" WHERE id = ?");

    let mut q = sqlx::query(&sql)
        .bind(body.role_id.unwrap_or(current.role_id))
        .bind(body.account_id.or(current.account_id));
    if let Some(hash) = password_hash {
        q = q.bind(hash);
    }

    q.bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| db_error(e, "Username must be unique", "Linked account not found"))?;

    let user = fetch_user(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id", description = "User ID")),
    responses((status = 200), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let user = fetch_user(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    // Keep the availability fast path honest so the name can be reused.
    username_filter::remove(&user.username);
    crate::utils::username_cache::forget(&user.username).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
