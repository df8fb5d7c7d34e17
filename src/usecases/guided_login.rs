use std::io;

use crate::{
    domain::credentials::SessionCredentials,
    infra::contracts::CredentialsStore,
    usecases::login::{login, LoginBackend, LoginCommand, LoginError, LoginMethod},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub password_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            password_attempts: 3,
        }
    }
}

pub trait AuthTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()>;
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct StdTerminal;

impl AuthTerminal for StdTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        use std::io::Write;

        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(password) => Ok(Some(password)),
            Err(source) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(source) => Err(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidedLoginRequest {
    pub homeserver_url: String,
    pub identity_server_url: String,
    pub user: Option<String>,
    pub guest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedLoginOutcome {
    LoggedIn(SessionCredentials),
    ExitWithGuidance,
}

pub fn run_guided_login(
    terminal: &mut dyn AuthTerminal,
    backend: &dyn LoginBackend,
    store: &mut dyn CredentialsStore,
    request: GuidedLoginRequest,
    retry_policy: &RetryPolicy,
) -> io::Result<GuidedLoginOutcome> {
    terminal.print_line(&format!("Logging in to {}.", request.homeserver_url))?;

    if request.guest {
        let command = LoginCommand {
            homeserver_url: request.homeserver_url,
            identity_server_url: request.identity_server_url,
            method: LoginMethod::Guest,
        };

        return match login(backend, store, command) {
            Ok(credentials) => finish(terminal, credentials),
            Err(error) => {
                report_error(terminal, &error, 0)?;
                Ok(GuidedLoginOutcome::ExitWithGuidance)
            }
        };
    }

    let user = match request.user {
        Some(user) => user,
        None => {
            let Some(user) = terminal.prompt_line("User (e.g. @alice:matrix.org): ")? else {
                terminal.print_line("Input cancelled (EOF). Run rmx login again to retry.")?;
                return Ok(GuidedLoginOutcome::ExitWithGuidance);
            };
            user
        }
    };

    let attempts = retry_policy.password_attempts;
    for attempt in 1..=attempts {
        let Some(password) = terminal.prompt_secret("Password: ")? else {
            terminal.print_line("Input cancelled (EOF). Run rmx login again to retry.")?;
            return Ok(GuidedLoginOutcome::ExitWithGuidance);
        };

        let command = LoginCommand {
            homeserver_url: request.homeserver_url.clone(),
            identity_server_url: request.identity_server_url.clone(),
            method: LoginMethod::Password {
                user: user.clone(),
                password,
            },
        };

        match login(backend, store, command) {
            Ok(credentials) => return finish(terminal, credentials),
            Err(error) => {
                let attempts_left = attempts.saturating_sub(attempt);
                if !report_error(terminal, &error, attempts_left)? {
                    return Ok(GuidedLoginOutcome::ExitWithGuidance);
                }
            }
        }
    }

    terminal.print_line("Login failed too many times. Please run rmx login again later.")?;
    Ok(GuidedLoginOutcome::ExitWithGuidance)
}

fn finish(
    terminal: &mut dyn AuthTerminal,
    credentials: SessionCredentials,
) -> io::Result<GuidedLoginOutcome> {
    terminal.print_line(&format!(
        "Logged in as {} (device {}). Session saved.",
        credentials.user_id, credentials.device_id
    ))?;

    Ok(GuidedLoginOutcome::LoggedIn(credentials))
}

/// Prints a user-facing message; returns whether another attempt makes sense.
fn report_error(
    terminal: &mut dyn AuthTerminal,
    error: &LoginError,
    attempts_left: usize,
) -> io::Result<bool> {
    match error {
        LoginError::EmptyPassword => {
            terminal.print_line(&format!(
                "LOGIN_EMPTY_PASSWORD: Password cannot be empty. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        LoginError::InvalidCredentials => {
            terminal.print_line(&format!(
                "LOGIN_INVALID_CREDENTIALS: Wrong user or password. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        LoginError::TemporarilyUnavailable { code } => {
            terminal.print_line(&format!(
                "{code}: Homeserver is temporarily unavailable. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        LoginError::RateLimited { retry_after_ms } => {
            let wait = retry_after_ms
                .map(|ms| format!(" Wait about {}s before retrying.", ms.div_ceil(1000)))
                .unwrap_or_default();
            terminal.print_line(&format!("LOGIN_RATE_LIMITED: Too many attempts.{wait}"))?;
            Ok(false)
        }
        LoginError::EmptyUser => {
            terminal.print_line("LOGIN_EMPTY_USER: User name cannot be empty.")?;
            Ok(false)
        }
        LoginError::GuestAccessDisabled => {
            terminal.print_line(
                "LOGIN_GUEST_DISABLED: This homeserver does not allow guest access. Log in with a password instead.",
            )?;
            Ok(false)
        }
        LoginError::Store(details) => {
            terminal.print_line(&format!(
                "LOGIN_STORE_FAILED: Logged in but the session could not be saved: {details}"
            ))?;
            Ok(false)
        }
    }
}
