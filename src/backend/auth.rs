//! Typed client for the backend auth endpoints.

use crate::error::{Result, SysselError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signup/signin request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Account info returned by signup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Bearer token returned by signin.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Client for account creation and sign-in against the task backend.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Create an auth client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Register a new account. The backend rejects duplicate emails with 400.
    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 400 {
                Err(SysselError::Auth(body))
            } else {
                Err(SysselError::Backend {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Exchange credentials for a bearer token.
    pub async fn signin(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/signin", self.base_url))
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status.as_u16() == 401 {
            Err(SysselError::Auth("invalid email or password".to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SysselError::Backend {
                status: status.as_u16(),
                body,
            })
        }
    }
}
