use clap::Parser;
use error_stack::{Result, ResultExt};
use gatehouse::{config, grpc, http, App};
use std::net::IpAddr;

use super::CommandError;

/// Expose the auth service over both transports
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub http_port: Option<u16>,
    #[clap(long)]
    pub grpc_port: Option<u16>,
}

pub fn run(args: ServerCommand) -> Result<(), CommandError> {
    let mut config = config::Server::load().change_context(CommandError)?;
    args.override_config(&mut config);

    super::init_tracing();
    super::build_runtime()?.block_on(run_inner(config))
}

async fn run_inner(config: config::Server) -> Result<(), CommandError> {
    let app = App::new(config).await.change_context(CommandError)?;

    // Either transport going down takes the whole process with it;
    // there is no point serving only half the surface.
    tokio::try_join!(
        async { http::serve(app.clone()).await.change_context(CommandError) },
        async { grpc::serve(app.clone()).await.change_context(CommandError) },
    )?;

    Ok(())
}

impl ServerCommand {
    // override server configuration if set by the cli
    fn override_config(&self, config: &mut config::Server) {
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.http_port {
            config.http_port = port;
        }

        if let Some(port) = self.grpc_port {
            config.grpc_port = port;
        }
    }
}
