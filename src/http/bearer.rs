use actix_web::http::header;
use actix_web::FromRequest;
use futures::future::{ready, Ready};

use super::error::{Error, ErrorKind};

/// Bearer token pulled out of the `Authorization` header.
///
/// Extraction only checks the header's shape; whether the token
/// verifies is the handler's business. A missing or malformed header
/// is rejected before any token verification happens.
#[derive(Debug, Clone)]
pub struct Bearer(pub String);

impl FromRequest for Bearer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|v| !v.is_empty());

        ready(match token {
            Some(token) => Ok(Self(token.to_owned())),
            None => Err(Error::new(ErrorKind::MissingBearer)),
        })
    }
}
