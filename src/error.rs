use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use sqlx::error::ErrorKind;

/// User-visible failure taxonomy. Every handler surfaces one of these;
/// nothing is silently swallowed or retried.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn not_found(what: &str, id: u64) -> Self {
        ApiError::NotFound(format!("{what} with id {id} not found"))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

/// Translate a low-level sqlx failure into the taxonomy: unique-key
/// violations become conflicts, foreign-key violations a not-found for the
/// referenced entity. Anything else is logged and reported as internal.
pub fn db_error(err: sqlx::Error, on_conflict: &str, on_missing_ref: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation => return ApiError::Conflict(on_conflict.to_string()),
            ErrorKind::ForeignKeyViolation => {
                return ApiError::NotFound(on_missing_ref.to_string());
            }
            _ => {}
        }
    }
    internal(err)
}

/// For statements that cannot hit a constraint: log and report internal.
pub fn internal(err: sqlx::Error) -> ApiError {
    tracing::error!(error = %err, "Database operation failed");
    ApiError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::not_found("Account", 7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            ApiError::not_found("Payroll period", 42).to_string(),
            "Payroll period with id 42 not found"
        );
    }

    #[test]
    fn non_database_errors_stay_internal() {
        let err = db_error(sqlx::Error::RowNotFound, "dup", "missing");
        assert!(matches!(err, ApiError::Internal));
    }
}
