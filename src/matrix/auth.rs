use reqwest::StatusCode;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::{
    infra::secrets::sanitize_errcode,
    matrix::api::{self, AuthResponse, MatrixErrorBody, PasswordLoginRequest},
    usecases::login::{LoginBackend, LoginGrant, LoginSourceError},
};

const LOGIN_BACKEND_UNAVAILABLE: &str = "M_LOGIN_BACKEND_UNAVAILABLE";
const LOGIN_TRANSPORT_FAILED: &str = "M_LOGIN_TRANSPORT_FAILED";
const LOGIN_BAD_RESPONSE: &str = "M_LOGIN_BAD_RESPONSE";
const LOGIN_BAD_URL: &str = "M_LOGIN_BAD_URL";

const GUEST_ACCESS_FORBIDDEN: &str = "M_GUEST_ACCESS_FORBIDDEN";
const LIMIT_EXCEEDED: &str = "M_LIMIT_EXCEEDED";

/// Performs `/login` and guest `/register` calls over HTTP.
pub struct HttpLoginBackend {
    rt: Runtime,
    http: reqwest::Client,
    device_name: String,
}

impl HttpLoginBackend {
    pub fn new(device_name: impl Into<String>) -> Result<Self, LoginSourceError> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                tracing::error!(error = %error, "failed to initialize login runtime");
                unavailable(LOGIN_BACKEND_UNAVAILABLE)
            })?;

        let http = reqwest::Client::builder().build().map_err(|error| {
            tracing::error!(error = %error, "failed to build login http client");
            unavailable(LOGIN_BACKEND_UNAVAILABLE)
        })?;

        Ok(Self {
            rt,
            http,
            device_name: device_name.into(),
        })
    }

    fn post_auth<B: Serialize>(&self, url: Url, body: &B) -> Result<LoginGrant, LoginSourceError> {
        self.rt.block_on(async {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|error| {
                    tracing::warn!(error = %error, "login request failed");
                    unavailable(LOGIN_TRANSPORT_FAILED)
                })?;

            let status = response.status();
            if !status.is_success() {
                let body: MatrixErrorBody = response.json().await.unwrap_or_default();
                return Err(map_status_error(status, &body));
            }

            response
                .json::<AuthResponse>()
                .await
                .map(LoginGrant::from)
                .map_err(|error| {
                    tracing::warn!(error = %error, "login response did not parse");
                    unavailable(LOGIN_BAD_RESPONSE)
                })
        })
    }
}

impl LoginBackend for HttpLoginBackend {
    fn password_login(
        &self,
        homeserver_url: &str,
        user: &str,
        password: &str,
    ) -> Result<LoginGrant, LoginSourceError> {
        let url = api::endpoint(homeserver_url, "/login").map_err(|_| unavailable(LOGIN_BAD_URL))?;
        let body = PasswordLoginRequest::new(user, password, &self.device_name);

        self.post_auth(url, &body)
    }

    fn register_guest(&self, homeserver_url: &str) -> Result<LoginGrant, LoginSourceError> {
        let url =
            api::guest_register_url(homeserver_url).map_err(|_| unavailable(LOGIN_BAD_URL))?;

        self.post_auth(url, &serde_json::json!({}))
    }
}

impl From<AuthResponse> for LoginGrant {
    fn from(response: AuthResponse) -> Self {
        Self {
            user_id: response.user_id,
            access_token: response.access_token,
            device_id: response.device_id,
        }
    }
}

fn unavailable(code: &str) -> LoginSourceError {
    LoginSourceError::Unavailable {
        code: code.to_owned(),
    }
}

fn map_status_error(status: StatusCode, body: &MatrixErrorBody) -> LoginSourceError {
    if body.errcode == GUEST_ACCESS_FORBIDDEN {
        return LoginSourceError::GuestAccessDisabled;
    }

    if status == StatusCode::TOO_MANY_REQUESTS || body.errcode == LIMIT_EXCEEDED {
        return LoginSourceError::RateLimited {
            retry_after_ms: body.retry_after_ms,
        };
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        return LoginSourceError::Forbidden;
    }

    LoginSourceError::Unavailable {
        code: sanitize_errcode(&body.errcode),
    }
}
