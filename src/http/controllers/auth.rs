use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::http::error::Result;
use crate::http::Bearer;
use crate::util::Sensitive;
use crate::App;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: Sensitive<String>,
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: Sensitive<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: Sensitive<String>,
}

#[tracing::instrument(skip_all, name = "http.login")]
pub async fn login(app: web::Data<App>, form: web::Json<LoginRequest>) -> Result<HttpResponse> {
    form.validate()?;

    let user = app
        .auth
        .authenticate(form.username.as_str(), form.password.as_str())
        .await?;
    let token = app.auth.login(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: token.into(),
    }))
}

#[tracing::instrument(skip_all, name = "http.get_profile")]
pub async fn get_profile(app: web::Data<App>, bearer: Bearer) -> Result<HttpResponse> {
    let user = app.auth.get_profile(&bearer.0).await?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}
