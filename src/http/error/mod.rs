use error_stack::{Context, Report};
use thiserror::Error;
use tracing_error::SpanTrace;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds the HTTP shim can answer with.
///
/// The JSON body only ever carries the canned message; reports and
/// span traces stay on the server side of the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad username or password. One signal for both.
    InvalidCredentials,
    /// Bad, expired or orphaned session token.
    Unauthorized,
    /// The `Authorization` header is missing or not a Bearer token.
    MissingBearer,
    /// The request body failed schema validation.
    Validation(String),
    Internal,
}

#[derive(Debug, Error)]
#[error("Request failed")]
pub struct RequestError;

pub struct Error {
    kind: ErrorKind,
    report: Option<Report<RequestError>>,
    trace: SpanTrace,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            report: None,
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn with_report(kind: ErrorKind, report: Report<impl Context>) -> Self {
        Self {
            kind,
            report: Some(report.change_context(RequestError)),
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("report", &self.report)
            .field("trace", &self.trace)
            .finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.message())?;
        if let Some(report) = &self.report {
            writeln!(f)?;
            writeln!(f, "{report:?}")?;
        }

        std::fmt::Display::fmt(&self.trace, f)
    }
}
