//! Sessionkit command-line tool.
//!
//! Inspects and ends persisted provider sessions without prompting:
//!
//! - `sessionkit status` reports whether a usable session exists
//! - `sessionkit token [scopes]` prints an access token covering `scopes`
//! - `sessionkit sign-out` ends the session with the auth backend

mod cli;
mod config;

use std::sync::Arc;

use clap::Parser;
use sessionkit_application::ports::SystemClock;
use sessionkit_application::{AuthRequestOptions, GetSessionOptions, OAuth2Client, OAuthRequestManager, SessionManager};
use sessionkit_infrastructure::{
    ChannelWindowHost, ClientEnvironment, FileStorage, UrlPatternDiscovery, direct_client,
    mediated_client,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = Cli::parse().command();

    let settings = Settings::from_env().await?;
    tracing::debug!(
        provider = %settings.provider.provider.id,
        state_dir = %settings.state_dir.display(),
        "sessionkit v{}",
        env!("CARGO_PKG_VERSION")
    );

    let env = ClientEnvironment {
        discovery: Arc::new(UrlPatternDiscovery::compile(settings.discovery_pattern.clone())?),
        window: Arc::new(ChannelWindowHost::new(settings.app_origin.clone(), (1920, 1080))),
        storage: Arc::new(FileStorage::new(settings.state_dir.clone())),
        clock: Arc::new(SystemClock),
    };

    if settings.direct {
        let client = direct_client(settings.provider, &env)?;
        run(&client, command).await
    } else {
        let client = mediated_client(settings.provider, &env, &OAuthRequestManager::new())?;
        run(&client, command).await
    }
}

async fn run<M: SessionManager>(
    client: &OAuth2Client<M>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = &client.provider().id;
    match command {
        Command::Status => {
            let session = client
                .session_manager()
                .get_session(&GetSessionOptions::default().optional())
                .await?;
            match session {
                Some(session) => {
                    let scopes: Vec<&str> = session.scopes().iter().map(String::as_str).collect();
                    println!("{provider}: signed in");
                    println!("  scopes:  {}", scopes.join(" "));
                    println!("  expires: {}", session.earliest_expiry().to_rfc3339());
                    if let Some(email) = &session.profile.email {
                        println!("  email:   {email}");
                    }
                }
                None => println!("{provider}: signed out"),
            }
        }
        Command::Token { scopes } => {
            let scope = scopes.join(" ");
            match client.get_access_token(&scope, AuthRequestOptions::optional()).await? {
                Some(token) => println!("{token}"),
                None => {
                    eprintln!("{provider}: no session covering '{scope}', sign in first");
                    std::process::exit(1);
                }
            }
        }
        Command::SignOut => {
            client.sign_out().await?;
            println!("{provider}: signed out");
        }
    }
    Ok(())
}
