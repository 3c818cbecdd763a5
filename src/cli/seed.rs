use clap::Parser;
use error_stack::{Result, ResultExt};
use gatehouse::auth::AuthError;
use gatehouse::{config, App};
use tracing::{info, warn};

use super::CommandError;

/// Seed the credential store with demo accounts
#[derive(Debug, Parser)]
pub struct SeedCommand {
    /// Also create the extra test accounts next to `admin`.
    #[clap(long)]
    pub with_test_users: bool,
}

const ADMIN: (&str, &str, &str) = ("admin", "admin@example.com", "admin");

const TEST_USERS: [(&str, &str, &str); 2] = [
    ("user1", "user1@example.com", "user1"),
    ("testuser", "test@example.com", "testuser"),
];

pub fn run(args: SeedCommand) -> Result<(), CommandError> {
    let config = config::Server::load().change_context(CommandError)?;

    super::init_tracing();
    super::build_runtime()?.block_on(seed(config, args.with_test_users))
}

async fn seed(config: config::Server, with_test_users: bool) -> Result<(), CommandError> {
    let app = App::new(config).await.change_context(CommandError)?;

    let mut accounts = vec![ADMIN];
    if with_test_users {
        accounts.extend(TEST_USERS);
    }

    for (username, email, password) in accounts {
        match app.auth.register(username, email, password).await {
            Ok(user) => info!("created user {} ({})", user.username, user.email),
            Err(report) if *report.current_context() == AuthError::UsernameTaken => {
                warn!("user {username} already exists - skipping");
            }
            Err(report) => return Err(report.change_context(CommandError)),
        }
    }

    info!("seeding finished; log in with admin / admin");
    Ok(())
}
