use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rmx", about = "Matrix client session tool")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Restore the stored session and print the synced timeline
    Run,
    /// Log in and store the session
    Login {
        /// Homeserver base URL (default: from config)
        #[arg(long)]
        homeserver: Option<String>,
        /// Matrix user id; prompted for when missing
        #[arg(short, long, conflicts_with = "guest")]
        user: Option<String>,
        /// Register a guest account instead of logging in
        #[arg(long)]
        guest: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn defaults_to_run_when_command_is_missing() {
        let cli = Cli::parse_from(["rmx"]);

        assert_eq!(cli.command_or_default(), Command::Run);
    }

    #[test]
    fn parses_explicit_run_command() {
        let cli = Cli::parse_from(["rmx", "run", "--config", "custom.toml"]);

        assert_eq!(cli.command_or_default(), Command::Run);
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn parses_login_options() {
        let cli = Cli::parse_from([
            "rmx",
            "login",
            "--homeserver",
            "https://hs.example.org",
            "--user",
            "@alice:example.org",
        ]);

        assert_eq!(
            cli.command_or_default(),
            Command::Login {
                homeserver: Some("https://hs.example.org".to_owned()),
                user: Some("@alice:example.org".to_owned()),
                guest: false,
            }
        );
    }

    #[test]
    fn guest_login_conflicts_with_user() {
        let result = Cli::try_parse_from(["rmx", "login", "--guest", "--user", "@a:b"]);

        assert!(result.is_err());
    }

    #[test]
    fn parses_logout_and_whoami() {
        assert_eq!(
            Cli::parse_from(["rmx", "logout"]).command_or_default(),
            Command::Logout
        );
        assert_eq!(
            Cli::parse_from(["rmx", "whoami"]).command_or_default(),
            Command::Whoami
        );
    }
}
