use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sessionkit")]
#[command(about = "Inspect and end persisted provider sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Subcommand to run, `status` when none was given.
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Status)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report whether a usable session exists
    Status,

    /// Print an access token covering the given scopes
    Token {
        /// Scopes the token must cover
        scopes: Vec<String>,
    },

    /// End the session with the auth backend
    SignOut,
}
