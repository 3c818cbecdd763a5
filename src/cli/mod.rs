use clap::Parser;
use error_stack::Result;
use thiserror::Error;

mod seed;
mod server;

#[derive(Debug, Error)]
#[error("Command failed")]
pub struct CommandError;

/// Command line options for gatehouse.
#[derive(Debug, Parser)]
#[command(
    about = "Authentication and streaming demo service",
    version,
    author
)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CommandError> {
        match self.subcommand {
            Subcommand::Server(args) => server::run(args),
            Subcommand::Seed(args) => seed::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Server(server::ServerCommand),
    Seed(seed::SeedCommand),
}

fn init_tracing() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

fn build_runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    use error_stack::ResultExt;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(CommandError)
        .attach_printable("could not build tokio runtime")
}
