use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::App;

mod bearer;
pub mod controllers;
pub mod error;

pub use bearer::Bearer;
pub use error::{Error, ErrorKind};

#[derive(Debug, Error)]
#[error("Failed to run the HTTP transport")]
pub struct ServeError;

/// Rejects malformed JSON bodies before they reach a handler.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::new(ErrorKind::Validation(err.to_string())).into())
}

/// Runs the HTTP/JSON shim until the process is asked to stop.
#[tracing::instrument(skip_all, name = "http.serve", fields(addr = %app.config.http_addr()))]
pub async fn serve(app: App) -> Result<(), ServeError> {
    let addr = app.config.http_addr();
    let workers = app.config.workers;

    info!("HTTP transport is listening at http://{addr}");

    HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .app_data(json_config())
            .wrap(TracingLogger::default())
            .configure(controllers::configure)
    })
    .workers(workers)
    .bind(addr)
    .change_context(ServeError)
    .attach_printable("could not bind the HTTP listener")?
    .run()
    .await
    .change_context(ServeError)
}
