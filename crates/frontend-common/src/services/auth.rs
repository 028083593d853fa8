//! GoTrue (Supabase Auth) REST client

use crate::browser::now_secs;
use async_trait::async_trait;
use carenest_core::{
    AppConfig, AuthClient, AuthError, AuthEvent, AuthEventBus, AuthEventKind, AuthListener,
    KeyValueStore, RedirectTokens, Session, SessionStore, SignUpRequest, Subscription, User,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Refresh this long before the access token expires
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Error body shapes the auth service uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Auth client persisting its session in web storage and announcing every
/// change through an [`AuthEventBus`]
pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    sessions: SessionStore,
    bus: Rc<AuthEventBus>,
}

impl GoTrueClient {
    pub fn new(config: &AppConfig, storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: config.auth_url(),
            anon_key: config.supabase_anon_key.clone(),
            sessions: SessionStore::new(storage),
            bus: AuthEventBus::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.auth_url))
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
    }

    fn authorized(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.request(method, path)
            .bearer_auth(&session.access_token)
    }

    async fn send(request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(text);
        Err(AuthError::from_api(status, message))
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AuthError> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Unexpected(e.to_string()))
    }

    fn store_and_emit(&self, kind: AuthEventKind, session: Session) -> Session {
        if let Err(error) = self.sessions.save(&session) {
            warn!(%error, "Failed to persist session");
        }
        self.bus.emit(&AuthEvent::new(kind, Some(session.clone())));
        session
    }

    fn forget_session(&self) {
        if let Err(error) = self.sessions.clear() {
            warn!(%error, "Failed to clear stored session");
        }
    }

    fn stored_session(&self) -> Option<Session> {
        self.sessions.load().unwrap_or_else(|error| {
            warn!(%error, "Stored session unavailable");
            None
        })
    }

    /// Exchange the refresh token for a new session
    ///
    /// A failed refresh is announced as `TOKEN_REFRESHED` without a session.
    /// A rejected refresh token also drops the stored session; network
    /// failures keep it for the next attempt.
    pub async fn refresh_session(&self, current: &Session) -> Result<Session, AuthError> {
        debug!("Refreshing session");
        let request = self
            .request(Method::POST, "/token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": current.refresh_token }));

        let result = match Self::send(request).await {
            Ok(response) => Self::parse::<Session>(response).await,
            Err(error) => Err(error),
        };

        match result {
            Ok(session) => Ok(self.store_and_emit(
                AuthEventKind::TokenRefreshed,
                session.with_expiry_from(now_secs()),
            )),
            Err(error) => {
                warn!(%error, "Session refresh failed");
                if error.is_invalid_refresh_token() {
                    self.forget_session();
                }
                self.bus
                    .emit(&AuthEvent::new(AuthEventKind::TokenRefreshed, None));
                Err(error)
            }
        }
    }

    /// Establish a session from the tokens in a redirect link's fragment
    ///
    /// Returns `Ok(None)` when the fragment carries no tokens.
    pub async fn session_from_fragment(&self, fragment: &str) -> Result<Option<Session>, AuthError> {
        let Some(tokens) = RedirectTokens::parse(fragment) else {
            return Ok(None);
        };
        let kind = tokens.event_kind();

        let response = Self::send(
            self.request(Method::GET, "/user")
                .bearer_auth(&tokens.access_token),
        )
        .await?;
        let user: User = Self::parse(response).await?;
        info!(user_id = %user.id, %kind, "Session established from redirect link");

        let session = tokens.into_session(user, now_secs());
        Ok(Some(self.store_and_emit(kind, session)))
    }

    /// Announce the stored session (if any) to subscribers
    pub fn emit_initial_session(&self) {
        self.bus.emit(&AuthEvent::new(
            AuthEventKind::InitialSession,
            self.stored_session(),
        ));
    }
}

#[async_trait(?Send)]
impl AuthClient for GoTrueClient {
    fn subscribe(&self, listener: AuthListener) -> Subscription {
        self.bus.subscribe(listener)
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };
        if session.expires_within(now_secs(), REFRESH_MARGIN_SECS) {
            return self.refresh_session(&session).await.map(Some);
        }
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let result = match self.stored_session() {
            Some(session) => Self::send(self.authorized(Method::POST, "/logout", &session))
                .await
                .map(|_| ()),
            None => Ok(()),
        };

        // Local sign-out happens regardless of what the service said.
        self.forget_session();
        self.bus.emit(&AuthEvent::new(AuthEventKind::SignedOut, None));
        result
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let request = self
            .request(Method::POST, "/token?grant_type=password")
            .json(&json!({ "email": email.trim(), "password": password }));
        let session: Session = Self::parse(Self::send(request).await?).await?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(self.store_and_emit(AuthEventKind::SignedIn, session.with_expiry_from(now_secs())))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError> {
        let body = json!({
            "email": request.email.trim(),
            "password": request.password,
            "data": { "full_name": request.full_name.trim() },
        });
        let value: serde_json::Value =
            Self::parse(Self::send(self.request(Method::POST, "/signup").json(&body)).await?)
                .await?;

        // Without an access token the account is waiting for email confirmation.
        if value.get("access_token").is_none() {
            info!("Sign-up pending email confirmation");
            return Ok(None);
        }
        let session: Session =
            serde_json::from_value(value).map_err(|e| AuthError::Unexpected(e.to_string()))?;
        Ok(Some(self.store_and_emit(
            AuthEventKind::SignedIn,
            session.with_expiry_from(now_secs()),
        )))
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut request = self
            .request(Method::POST, "/recover")
            .json(&json!({ "email": email.trim() }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        Self::send(request).await.map(|_| ())
    }

    async fn update_password(&self, password: &str) -> Result<User, AuthError> {
        let session = self
            .get_session()
            .await?
            .ok_or(AuthError::SessionMissing)?;
        let request = self
            .authorized(Method::PUT, "/user", &session)
            .json(&json!({ "password": password }));
        let user: User = Self::parse(Self::send(request).await?).await?;

        let updated = Session {
            user: user.clone(),
            ..session
        };
        self.store_and_emit(AuthEventKind::UserUpdated, updated);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_description() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#,
        )
        .unwrap();
        let message = body.into_message().unwrap();
        assert!(AuthError::from_api(400, message).is_invalid_refresh_token());
    }

    #[test]
    fn error_body_falls_back_to_msg() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code":422,"msg":"Password should be at least 6 characters"}"#)
                .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Password should be at least 6 characters")
        );
    }
}
