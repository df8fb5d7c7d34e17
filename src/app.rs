use std::path::Path;

use anyhow::{anyhow, Result};

use crate::{
    cli::{Cli, Command},
    domain::{
        self,
        events::{SyncSignal, SyncState},
    },
    infra::{
        self,
        config::AppConfig,
        secrets::mask_token,
        session_store::{FileCredentialsStore, SyncStore},
        storage_layout::StorageLayout,
    },
    matrix::{self, auth::HttpLoginBackend, HomeserverClientFactory, MatrixClient},
    ui::{self, timeline::build_timeline_lines},
    usecases::{
        self, bootstrap,
        context::AppContext,
        guided_login::{
            run_guided_login, GuidedLoginOutcome, GuidedLoginRequest, RetryPolicy, StdTerminal,
        },
        logout::logout,
        restore::{restore, RestoreError},
        session::{ClientSession, SessionSettings},
        startup,
    },
};

const DEVICE_NAME: &str = "rmx";
const APP_NO_STORED_SESSION: &str = "APP_NO_STORED_SESSION";

type Session = ClientSession<HomeserverClientFactory>;

struct Stores {
    credentials: FileCredentialsStore,
    sync: SyncStore,
}

impl Stores {
    fn new(layout: &StorageLayout) -> Self {
        Self {
            credentials: FileCredentialsStore::new(layout.credentials_file()),
            sync: SyncStore::new(layout.sync_file()),
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        matrix = matrix::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let command = cli.command_or_default();
    let context = match command {
        Command::Logout => logout_context(cli.config.as_deref())?,
        _ => bootstrap::bootstrap(cli.config.as_deref())?,
    };

    let _startup = startup::plan_startup(&context.layout)?;
    let mut stores = Stores::new(&context.layout);
    let mut session = ClientSession::new(
        HomeserverClientFactory,
        SessionSettings::from(&context.config.client),
        Some(stores.sync.clone()),
    );

    match command {
        Command::Run => run_timeline(&mut session, &stores)?,
        Command::Login {
            homeserver,
            user,
            guest,
        } => {
            let request = GuidedLoginRequest {
                homeserver_url: homeserver.unwrap_or_else(|| context.config.homeserver.url.clone()),
                identity_server_url: context.config.homeserver.identity_server_url.clone(),
                user,
                guest,
            };
            login_interactively(&mut session, &mut stores, request)?;
        }
        Command::Logout => {
            let outcome = logout(&mut session, &mut stores.credentials, &stores.sync)?;
            tracing::info!(
                credentials_removed = outcome.credentials_removed,
                sync_position_removed = outcome.sync_position_removed,
                "logout/reset completed"
            );
            println!("Logged out. Run `rmx login` to sign in again.");
        }
        Command::Whoami => {
            if restore_or_report(&mut session, &stores)? {
                for line in whoami_lines(&session)? {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

/// Logout must work even when the config is broken, so it falls back to
/// defaults instead of failing.
fn logout_context(config_path: Option<&Path>) -> Result<AppContext> {
    match bootstrap::bootstrap(config_path) {
        Ok(context) => Ok(context),
        Err(error) => {
            tracing::warn!(
                error = ?error,
                "logout fallback: bootstrap failed, continuing with local cleanup"
            );
            Ok(AppContext::new(AppConfig::default(), StorageLayout::resolve()?))
        }
    }
}

fn login_interactively(
    session: &mut Session,
    stores: &mut Stores,
    request: GuidedLoginRequest,
) -> Result<()> {
    let backend = HttpLoginBackend::new(DEVICE_NAME)
        .map_err(|error| anyhow!("failed to prepare login: {error:?}"))?;

    let mut terminal = StdTerminal;
    let outcome = run_guided_login(
        &mut terminal,
        &backend,
        &mut stores.credentials,
        request,
        &RetryPolicy::default(),
    )?;

    if let GuidedLoginOutcome::LoggedIn(credentials) = outcome {
        // A new login starts its sync from scratch.
        stores.sync.clear()?;
        session.replace(&credentials)?;
    }

    Ok(())
}

/// Restores the stored session; false when there is none to restore.
fn restore_or_report(session: &mut Session, stores: &Stores) -> Result<bool> {
    match restore(session, &stores.credentials) {
        Ok(_) => Ok(true),
        Err(RestoreError::NoStoredSession) => {
            tracing::info!(code = APP_NO_STORED_SESSION, "nothing to restore");
            println!("No stored session. Run `rmx login` first.");
            Ok(false)
        }
        Err(error) => Err(error.into()),
    }
}

fn run_timeline(session: &mut Session, stores: &Stores) -> Result<()> {
    if !restore_or_report(session, stores)? {
        return Ok(());
    }

    let signals = session.client()?.subscribe()?;
    session.start()?;
    println!("Syncing as {}. Press Ctrl-C to quit.", session.client()?.user_id());

    for signal in signals {
        match signal {
            SyncSignal::Batch(batch) => {
                let client = session.get().map(|client| client as &dyn MatrixClient);
                for line in build_timeline_lines(&batch.events, client) {
                    println!("{}", line.to_text());
                }
            }
            SyncSignal::State(SyncState::Stopped) => break,
            SyncSignal::State(SyncState::Error) => {
                eprintln!("Sync failed; see the log for details.");
            }
            SyncSignal::State(state) => {
                tracing::debug!(state = state.as_label(), "sync state changed");
            }
        }
    }

    session.unset();
    Ok(())
}

fn whoami_lines(session: &Session) -> Result<Vec<String>> {
    let credentials = session.credentials()?;
    let kind = if credentials.guest { "guest" } else { "user" };

    Ok(vec![
        format!("{} ({kind})", credentials.user_id),
        format!("homeserver: {}", credentials.homeserver_url),
        format!("device: {}", credentials.device_id),
        format!("access token: {}", mask_token(&credentials.access_token)),
    ])
}
