use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, db_error, internal};
use crate::model::branch::Branch;

#[derive(Deserialize, ToSchema)]
pub struct CreateBranch {
    #[schema(example = "BR1")]
    pub code: String,
    #[schema(example = "Branch One")]
    pub name: String,
    #[schema(example = "456 Market Ave, Uptown")]
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateBranch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

async fn fetch_branch(pool: &MySqlPool, id: u64) -> Result<Branch, ApiError> {
    sqlx::query_as::<_, Branch>(
        "SELECT id, code, name, address, is_active FROM branches WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::not_found("Branch", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/branches",
    request_body = CreateBranch,
    responses(
        (status = 201, body = Branch),
        (status = 409, description = "Branch code must be unique")
    ),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
pub async fn create_branch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateBranch>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let result = sqlx::query(
        r#"
        INSERT INTO branches (code, name, address, is_active)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.code)
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Branch code must be unique", "Related record not found"))?;

    let branch = fetch_branch(pool.get_ref(), result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(branch))
}

#[utoipa::path(
    get,
    path = "/api/v1/branches",
    responses((status = 200, body = [Branch])),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
pub async fn list_branches(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let branches = sqlx::query_as::<_, Branch>(
        "SELECT id, code, name, address, is_active FROM branches ORDER BY code",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    Ok(HttpResponse::Ok().json(branches))
}

#[utoipa::path(
    get,
    path = "/api/v1/branches/{id}",
    params(("id", description = "Branch ID")),
    responses((status = 200, body = Branch), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
pub async fn get_branch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let branch = fetch_branch(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(branch))
}

#[utoipa::path(
    put,
    path = "/api/v1/branches/{id}",
    request_body = UpdateBranch,
    params(("id", description = "Branch ID")),
    responses((status = 200, body = Branch), (status = 404), (status = 409)),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
pub async fn update_branch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateBranch>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();
    let current = fetch_branch(pool.get_ref(), id).await?;

    sqlx::query(
        r#"
        UPDATE branches
        SET code = ?, name = ?, address = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(body.code.as_ref().unwrap_or(&current.code))
    .bind(body.name.as_ref().unwrap_or(&current.name))
    .bind(body.address.as_ref().or(current.address.as_ref()))
    .bind(body.is_active.unwrap_or(current.is_active))
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Branch code must be unique", "Related record not found"))?;

    let branch = fetch_branch(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(branch))
}

#[utoipa::path(
    delete,
    path = "/api/v1/branches/{id}",
    params(("id", description = "Branch ID")),
    responses((status = 200), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "Branches"
)]
pub async fn delete_branch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_privileged()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM branches WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            // Restricted by accounts still pointing at the branch.
            if let sqlx::Error::Database(db_err) = &e {
                if matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
                    return ApiError::Conflict("Branch still has records attached".into());
                }
            }
            internal(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Branch", id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
