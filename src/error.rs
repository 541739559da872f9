//! API error taxonomy shared by services, middleware, and handlers.
//!
//! Repository errors convert into [`ApiError`] via `From`, handlers bubble it
//! with `?`, and the `IntoResponse` impl renders the failure envelope. The
//! HTTP mapping is deliberately coarse: domain failures are `400`, the
//! filter/policy level produces `401`/`403`, anything unexpected is a `500`
//! with a generic reason (the cause is only logged).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::jwt::JwtError;
use crate::db::models::VerificationKind;
use crate::db::repositories::{
    RoleRepositoryError, UserRepositoryError, VerificationRepositoryError,
};
use crate::response::HttpResponse;

/// Every failure the API surface can report.
///
/// Display strings are the exact client-facing `reason` texts.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request field validation failed; carries the joined field messages.
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password; never reveals which.
    #[error("Invalid email or password. Please try again")]
    AuthenticationFailed,

    #[error("Your account is currently disabled")]
    AccountDisabled,

    #[error("Your account is currently locked")]
    AccountLocked,

    /// Signature, issuer, or structure check failed.
    /// Shares its client message with [`ApiError::TokenExpired`] so callers
    /// cannot distinguish the two.
    #[error("Invalid claim in token")]
    TokenInvalid,

    #[error("Invalid claim in token")]
    TokenExpired,

    /// Verification key does not match any stored link.
    #[error("{}", .0.invalid_link_reason())]
    LinkInvalid(VerificationKind),

    #[error("The link has expired. Please reset your password again")]
    LinkExpired,

    #[error("Passwords don't match. Please try again")]
    PasswordMismatch,

    #[error("Email already in use. Please use a different email and try again")]
    DuplicateEmail,

    /// Unknown user or role; carries the lookup-specific message.
    #[error("{0}")]
    NotFound(String),

    /// Protected resource reached without an authenticated context.
    #[error("You need to be authenticated to access this resource.")]
    Unauthenticated,

    /// Authenticated but missing the required authority.
    #[error("You do not have enough permission")]
    Forbidden,

    /// Infrastructure failure; the detail is logged, never sent to clients.
    #[error("An error occurred. Please try again.")]
    Unexpected(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<UserRepositoryError> for ApiError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::EmailAlreadyExists => ApiError::DuplicateEmail,
            UserRepositoryError::NotFound => {
                ApiError::NotFound("No user found for this account".to_string())
            }
            _ => ApiError::Unexpected(err.to_string()),
        }
    }
}

impl From<RoleRepositoryError> for ApiError {
    fn from(err: RoleRepositoryError) -> Self {
        match err {
            RoleRepositoryError::NotFoundByName(name) => {
                ApiError::NotFound(format!("No role found by name: {name}"))
            }
            _ => ApiError::Unexpected(err.to_string()),
        }
    }
}

impl From<VerificationRepositoryError> for ApiError {
    fn from(err: VerificationRepositoryError) -> Self {
        ApiError::Unexpected(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::TokenExpired,
            _ => ApiError::TokenInvalid,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unexpected(detail) = &self {
            tracing::error!(error = %detail, "unexpected server error");
        }
        HttpResponse::failure(self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Status Mapping Tests
    // ========================================================================

    #[test]
    fn test_domain_errors_map_to_bad_request() {
        assert_eq!(
            ApiError::AuthenticationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::AccountDisabled.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::TokenExpired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PasswordMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateEmail.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_filter_level_errors_map_to_401_and_403() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unexpected_maps_to_500() {
        assert_eq!(
            ApiError::Unexpected("connection refused".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ========================================================================
    // Client Message Tests
    // ========================================================================

    #[test]
    fn test_token_failures_collapse_to_one_message() {
        assert_eq!(format!("{}", ApiError::TokenInvalid), "Invalid claim in token");
        assert_eq!(format!("{}", ApiError::TokenExpired), "Invalid claim in token");
    }

    #[test]
    fn test_unexpected_hides_detail() {
        let err = ApiError::Unexpected("pool timed out waiting for an open connection".to_string());
        assert_eq!(format!("{}", err), "An error occurred. Please try again.");
    }

    #[test]
    fn test_link_messages_per_flow() {
        assert_eq!(
            format!("{}", ApiError::LinkInvalid(VerificationKind::Account)),
            "This link is not valid."
        );
        assert_eq!(
            format!("{}", ApiError::LinkInvalid(VerificationKind::Password)),
            "This link is not valid. Please reset your password again"
        );
        assert_eq!(
            format!("{}", ApiError::LinkExpired),
            "The link has expired. Please reset your password again"
        );
    }

    #[test]
    fn test_exact_client_messages() {
        assert_eq!(
            format!("{}", ApiError::DuplicateEmail),
            "Email already in use. Please use a different email and try again"
        );
        assert_eq!(
            format!("{}", ApiError::PasswordMismatch),
            "Passwords don't match. Please try again"
        );
        assert_eq!(
            format!("{}", ApiError::Unauthenticated),
            "You need to be authenticated to access this resource."
        );
        assert_eq!(
            format!("{}", ApiError::Forbidden),
            "You do not have enough permission"
        );
    }

    // ========================================================================
    // Error Conversion Tests
    // ========================================================================

    #[test]
    fn test_api_error_from_user_repository_error() {
        let err: ApiError = UserRepositoryError::EmailAlreadyExists.into();
        assert!(matches!(err, ApiError::DuplicateEmail));

        let err: ApiError = UserRepositoryError::HashingError("bad cost".to_string()).into();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[test]
    fn test_api_error_from_role_repository_error() {
        let err: ApiError = RoleRepositoryError::NotFoundByName("ROLE_USER".to_string()).into();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "No role found by name: ROLE_USER"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_from_jwt_error() {
        let err: ApiError = JwtError::Expired.into();
        assert!(matches!(err, ApiError::TokenExpired));

        let err: ApiError = JwtError::InvalidToken.into();
        assert!(matches!(err, ApiError::TokenInvalid));

        let err: ApiError = JwtError::MissingAuthorities.into();
        assert!(matches!(err, ApiError::TokenInvalid));
    }
}
