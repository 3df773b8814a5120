use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sonozen_storage::LocalStorage;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::provider::{AuthHandler, SessionProvider, Subscription};
use crate::types::{AuthEvent, Session, User};

/// 会话在本地存储中的键
pub const SESSION_KEY: &str = "sonozen-auth-token";

const EXPIRY_LEEWAY_SECS: i64 = 30;

/// GoTrue 风格身份服务的 REST 客户端
pub struct IdentityClient {
    url: String,
    anon_key: String,
    http: Client,
    storage: Arc<dyn LocalStorage>,
    events: broadcast::Sender<AuthEvent>,
}

/// 身份服务的 token 响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now + self.expires_in.unwrap_or(3600));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user,
        }
    }
}

impl IdentityClient {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        Self::with_client(url, anon_key, storage, Client::new())
    }

    pub fn with_client(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        storage: Arc<dyn LocalStorage>,
        http: Client,
    ) -> Self {
        let url: String = url.into();
        let (events, _) = broadcast::channel(32);
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http,
            storage,
            events,
        }
    }

    /// 邮箱密码登录，成功后持久化会话并广播 SignedIn
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> SessionResult<Session> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        self.persist(&session).await?;
        info!("Signed in as {}", session.email().unwrap_or(&session.user.id));
        self.publish(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// 用 refresh token 换取新会话并广播 TokenRefreshed
    pub async fn refresh_session(&self, refresh_token: &str) -> SessionResult<Session> {
        let session = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        self.persist(&session).await?;
        debug!("Session refreshed, expires at {}", session.expires_at);
        self.publish(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// 登出：远端调用失败时仍清除本地会话
    pub async fn sign_out(&self) -> SessionResult<()> {
        if let Some(session) = self.stored_session().await {
            let result = self
                .http
                .post(format!("{}/auth/v1/logout", self.url))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => warn!("Identity logout returned {}", response.status()),
                Err(e) => warn!("Identity logout failed: {}", e),
            }
        }

        self.storage.remove_item(SESSION_KEY).await?;
        self.publish(AuthEvent::SignedOut);
        info!("Signed out");
        Ok(())
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> SessionResult<Session> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SessionError::Auth {
                status: status.as_u16(),
                message: extract_error_message(&text)
                    .unwrap_or_else(|| format!("Identity provider returned {}", status)),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        Ok(token.into_session(now()))
    }

    async fn persist(&self, session: &Session) -> SessionResult<()> {
        let content = serde_json::to_string(session)?;
        self.storage.set_item(SESSION_KEY, &content).await?;
        Ok(())
    }

    async fn stored_session(&self) -> Option<Session> {
        match self.storage.get_item(SESSION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Stored session is corrupt, ignoring: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                None
            }
        }
    }

    fn publish(&self, event: AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl SessionProvider for IdentityClient {
    async fn current_session(&self) -> Option<Session> {
        let session = self.stored_session().await?;
        if !session.is_expired(now(), EXPIRY_LEEWAY_SECS) {
            return Some(session);
        }

        match self.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => Some(refreshed),
            Err(e) => {
                warn!("Session refresh failed, signing out locally: {}", e);
                if let Err(e) = self.storage.remove_item(SESSION_KEY).await {
                    warn!("Failed to clear stored session: {}", e);
                }
                self.publish(AuthEvent::SignedOut);
                None
            }
        }
    }

    fn on_change(&self, handler: AuthHandler) -> Subscription {
        Subscription::spawn(self.events.subscribe(), handler)
    }
}

/// GoTrue 错误体里的可读信息
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(String::from)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
