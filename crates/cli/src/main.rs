use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shelf_authz::{CredentialStore, IdentityIssuer, TokenIssuer};
use shelf_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "shelf", version, about = "Operate a shelf book service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C
    Serve,
    /// Authenticate a seeded account and print its bearer token
    Token {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Verify a token and print its identity payload as JSON
    Inspect { token: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load shelf settings")?;

    match cli.command {
        Command::Serve => serve(settings),
        Command::Token { username, password } => {
            let identity = IdentityIssuer::new(CredentialStore::seeded(), signing_tokens(&settings)?);
            let issued = identity
                .authenticate(&username, &password)
                .context("authentication failed")?;
            println!("{}", issued.token);
            Ok(())
        }
        Command::Inspect { token } => {
            let payload = signing_tokens(&settings)?
                .verify(&token)
                .context("token verification failed")?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
    }
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    shelf_telemetry::init(&settings.telemetry);
    tracing::info!(env = ?settings.environment, "shelf serve starting");

    tokio::runtime::Runtime::new()
        .context("failed to start async runtime")?
        .block_on(shelf_app::run(settings))
}

/// Offline token work only makes sense against the server's own secret.
fn signing_tokens(settings: &Settings) -> anyhow::Result<Arc<TokenIssuer>> {
    if settings.auth.jwt_secret.is_none() {
        bail!("auth.jwt_secret is not configured; set SHELF_AUTH__JWT_SECRET");
    }
    let tokens = TokenIssuer::from_settings(&settings.auth)?;
    Ok(Arc::new(tokens))
}
