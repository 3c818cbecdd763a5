use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::info;

use crate::App;

mod service;

pub use service::AuthGrpc;

// Generated code is textually included, so crate-level lints
// would apply to it.
#[allow(rust_2018_idioms)]
pub mod proto {
    tonic::include_proto!("auth");
}

#[derive(Debug, Error)]
#[error("Failed to run the gRPC transport")]
pub struct ServeError;

/// Runs the native RPC transport until the process is asked to stop.
#[tracing::instrument(skip_all, name = "grpc.serve", fields(addr = %app.config.grpc_addr()))]
pub async fn serve(app: App) -> Result<(), ServeError> {
    let addr = app.config.grpc_addr();

    info!("gRPC transport is listening at {addr}");

    tonic::transport::Server::builder()
        .add_service(proto::auth_service_server::AuthServiceServer::new(
            AuthGrpc::new(app),
        ))
        .serve(addr)
        .await
        .change_context(ServeError)
}
