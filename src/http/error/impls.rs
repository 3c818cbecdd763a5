use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use error_stack::Report;
use serde_json::json;

use super::{Error, ErrorKind};
use crate::auth::AuthError;

impl ErrorKind {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(..) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized | Self::MissingBearer => {
                StatusCode::UNAUTHORIZED
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidCredentials => "Invalid credentials",
            Self::Unauthorized => "Invalid or expired token",
            Self::MissingBearer => "Authorization header with Bearer token is required",
            Self::Validation(message) => message,
            Self::Internal => "Internal server error",
        }
    }
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.kind().message() }))
    }
}

impl From<Report<AuthError>> for Error {
    fn from(report: Report<AuthError>) -> Self {
        let kind = match report.current_context() {
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound => {
                ErrorKind::Unauthorized
            }
            AuthError::UsernameTaken => {
                ErrorKind::Validation("Username is already taken".to_string())
            }
            AuthError::Internal => ErrorKind::Internal,
        };

        Error::with_report(kind, report)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors
            .field_errors()
            .into_keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort_unstable();

        Error::new(ErrorKind::Validation(format!(
            "Invalid request fields: {}",
            fields.join(", ")
        )))
    }
}
