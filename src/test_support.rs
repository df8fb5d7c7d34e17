use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Mutex, MutexGuard},
};

use crate::{
    domain::credentials::SessionCredentials,
    matrix::{
        media, ClientError, ClientFactory, CreateClientOptions, MatrixClient, StartOptions,
    },
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub fn credentials(user_id: &str) -> SessionCredentials {
    SessionCredentials {
        homeserver_url: "https://matrix.example.org".to_owned(),
        identity_server_url: "https://vector.im".to_owned(),
        user_id: user_id.to_owned(),
        device_id: "DEVICE".to_owned(),
        access_token: format!("token-for-{user_id}"),
        guest: false,
    }
}

/// Shared record of lifecycle calls made on fake clients.
pub type ClientLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
pub struct FakeClient {
    pub options: CreateClientOptions,
    pub guest: bool,
    pub max_listeners: usize,
    pub started_with: Option<StartOptions>,
    log: ClientLog,
}

impl MatrixClient for FakeClient {
    fn base_url(&self) -> &str {
        &self.options.base_url
    }

    fn identity_base_url(&self) -> &str {
        &self.options.identity_base_url
    }

    fn user_id(&self) -> &str {
        &self.options.user_id
    }

    fn device_id(&self) -> &str {
        &self.options.device_id
    }

    fn access_token(&self) -> &str {
        &self.options.access_token
    }

    fn is_guest(&self) -> bool {
        self.guest
    }

    fn set_guest(&mut self, guest: bool) {
        self.guest = guest;
    }

    fn set_max_listeners(&mut self, max: usize) {
        self.max_listeners = max;
    }

    fn start_client(&mut self, options: StartOptions) -> Result<(), ClientError> {
        self.log
            .borrow_mut()
            .push(format!("start:{}", self.options.user_id));
        self.started_with = Some(options);
        Ok(())
    }

    fn stop_client(&mut self) {
        self.log
            .borrow_mut()
            .push(format!("stop:{}", self.options.user_id));
    }

    fn mxc_url_to_http(&self, mxc_url: &str) -> Option<String> {
        media::mxc_to_http(&self.options.base_url, mxc_url)
    }
}

#[derive(Debug, Default)]
pub struct FakeClientFactory {
    pub log: ClientLog,
}

impl ClientFactory for FakeClientFactory {
    type Client = FakeClient;

    fn create_client(&self, options: CreateClientOptions) -> Result<FakeClient, ClientError> {
        if options.user_id.is_empty() {
            return Err(ClientError::InvalidCredentials {
                field: "user id",
                reason: "must not be empty".to_owned(),
            });
        }

        self.log
            .borrow_mut()
            .push(format!("create:{}", options.user_id));

        Ok(FakeClient {
            options,
            guest: false,
            max_listeners: 0,
            started_with: None,
            log: Rc::clone(&self.log),
        })
    }
}
