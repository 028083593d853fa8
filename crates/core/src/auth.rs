//! Authentication types and the auth service seam
//!
//! The hosted auth service is reached only through [`AuthClient`]. The
//! browser implementation talks to the GoTrue REST API; tests inject a mock
//! or an [`AuthEventBus`]-backed fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Authenticated user as reported by the auth service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Display name from the sign-up metadata, falling back to the email
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .get("full_name")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)
            .or_else(|| self.email.clone())
    }
}

/// Token bundle issued by the auth service
///
/// Session recovery only looks at whether a session is present; the auth
/// client needs the tokens and expiry to refresh it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the service only sent the latter
    #[must_use]
    pub fn with_expiry_from(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now + secs);
        }
        self
    }

    /// Whether the access token expires within `margin_secs` of `now`
    #[must_use]
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - margin_secs <= now)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Kind of session-lifecycle notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        };
        f.write_str(name)
    }
}

/// Notification emitted by the auth client whenever its session changes
#[derive(Clone, Debug, PartialEq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    #[must_use]
    pub const fn new(kind: AuthEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    /// A refresh that came back without a session
    #[must_use]
    pub const fn is_empty_refresh(&self) -> bool {
        matches!(self.kind, AuthEventKind::TokenRefreshed) && self.session.is_none()
    }

    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// Errors returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid Refresh Token: {0}")]
    InvalidRefreshToken(String),

    #[error("Auth session missing")]
    SessionMissing,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Auth service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Marker the service puts in refresh-token rejections
    pub const INVALID_REFRESH_TOKEN_MARKER: &'static str = "invalid refresh token";

    /// Classify an error body returned by the service
    pub fn from_api(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if message
            .to_ascii_lowercase()
            .contains(Self::INVALID_REFRESH_TOKEN_MARKER)
        {
            Self::InvalidRefreshToken(message)
        } else {
            Self::Api { status, message }
        }
    }

    /// Whether the stored refresh token is known to be unusable
    #[must_use]
    pub fn is_invalid_refresh_token(&self) -> bool {
        match self {
            Self::InvalidRefreshToken(_) => true,
            Self::Api { message, .. } | Self::Unexpected(message) => message
                .to_ascii_lowercase()
                .contains(Self::INVALID_REFRESH_TOKEN_MARKER),
            Self::SessionMissing | Self::Network(_) => false,
        }
    }
}

/// Sign-up form payload
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Tokens the auth service appends to redirect links (`#access_token=...&type=recovery`)
#[derive(Clone, PartialEq, Eq)]
pub struct RedirectTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub link_type: Option<String>,
}

impl RedirectTokens {
    /// Parse a URL fragment, with or without the leading `#`
    #[must_use]
    pub fn parse(fragment: &str) -> Option<Self> {
        let mut access_token = None;
        let mut refresh_token = None;
        let mut expires_in = None;
        let mut link_type = None;
        for (key, value) in url::form_urlencoded::parse(fragment.trim_start_matches('#').as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                "expires_in" => expires_in = value.parse().ok(),
                "type" => link_type = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            access_token: access_token.filter(|t| !t.is_empty())?,
            refresh_token: refresh_token.filter(|t| !t.is_empty())?,
            expires_in,
            link_type,
        })
    }

    /// Whether this link came from a password-recovery email
    #[must_use]
    pub fn is_recovery(&self) -> bool {
        self.link_type.as_deref() == Some("recovery")
    }

    /// Event to announce once the session has been established
    #[must_use]
    pub fn event_kind(&self) -> AuthEventKind {
        if self.is_recovery() {
            AuthEventKind::PasswordRecovery
        } else {
            AuthEventKind::SignedIn
        }
    }

    #[must_use]
    pub fn into_session(self, user: User, now: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: default_token_type(),
            expires_in: self.expires_in,
            expires_at: None,
            user,
        }
        .with_expiry_from(now)
    }
}

impl fmt::Debug for RedirectTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectTokens")
            .field("link_type", &self.link_type)
            .finish_non_exhaustive()
    }
}

/// Callback invoked for every auth event, in delivery order
pub type AuthListener = Rc<dyn Fn(&AuthEvent)>;

/// Handle for an auth-event subscription; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Single-threaded fan-out of auth events to subscribers
#[derive(Default)]
pub struct AuthEventBus {
    listeners: RefCell<Vec<(u64, AuthListener)>>,
    next_id: Cell<u64>,
}

impl AuthEventBus {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn subscribe(self: &Rc<Self>, listener: AuthListener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));

        let bus: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(bus) = bus.upgrade() {
                bus.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    /// Deliver an event to every current subscriber
    pub fn emit(&self, event: &AuthEvent) {
        // Snapshot so listeners may unsubscribe while being notified.
        let listeners: Vec<AuthListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        tracing::debug!(kind = %event.kind, has_session = event.has_session(), subscribers = listeners.len(), "Emitting auth event");
        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// The hosted authentication service
#[async_trait(?Send)]
pub trait AuthClient {
    /// Register for session-lifecycle notifications
    fn subscribe(&self, listener: AuthListener) -> Subscription;

    /// Current session, refreshing it first when it has expired
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// Returns `None` when the service requires email confirmation first
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError>;

    async fn update_password(&self, password: &str) -> Result<User, AuthError>;
}

// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub AuthClient {}

        #[async_trait(?Send)]
        impl AuthClient for AuthClient {
            fn subscribe(&self, listener: AuthListener) -> Subscription;
            async fn get_session(&self) -> Result<Option<Session>, AuthError>;
            async fn sign_out(&self) -> Result<(), AuthError>;
            async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;
            async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError>;
            async fn reset_password_for_email<'life0, 'life1, 'life2>(&'life0 self, email: &'life1 str, redirect_to: Option<&'life2 str>) -> Result<(), AuthError>;
            async fn update_password(&self, password: &str) -> Result<User, AuthError>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_for;

    #[test]
    fn refresh_token_rejections_are_classified() {
        let err = AuthError::from_api(400, "Invalid Refresh Token: Refresh Token Not Found");
        assert!(matches!(err, AuthError::InvalidRefreshToken(_)));
        assert!(err.is_invalid_refresh_token());

        let other = AuthError::from_api(400, "Invalid login credentials");
        assert!(!other.is_invalid_refresh_token());
        assert!(!AuthError::Network("offline".into()).is_invalid_refresh_token());
    }

    #[test]
    fn expiry_is_derived_from_expires_in() {
        let mut session = session_for("user-1");
        session.expires_at = None;
        session.expires_in = Some(3600);
        let session = session.with_expiry_from(1_000);
        assert_eq!(session.expires_at, Some(4_600));
        assert!(!session.expires_within(1_000, 60));
        assert!(session.expires_within(4_550, 60));
    }

    #[test]
    fn debug_output_omits_tokens() {
        let rendered = format!("{:?}", session_for("user-1"));
        assert!(rendered.contains("user-1"));
        assert!(!rendered.contains("access-user-1"));
    }

    #[test]
    fn recovery_fragment_is_parsed() {
        let tokens = RedirectTokens::parse(
            "#access_token=abc&expires_in=3600&refresh_token=def&token_type=bearer&type=recovery",
        )
        .unwrap();
        assert!(tokens.is_recovery());
        assert_eq!(tokens.event_kind(), AuthEventKind::PasswordRecovery);

        let session = tokens.into_session(session_for("u").user, 100);
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token, "def");
        assert_eq!(session.expires_at, Some(3_700));
    }

    #[test]
    fn fragment_without_tokens_is_ignored() {
        assert!(RedirectTokens::parse("").is_none());
        assert!(RedirectTokens::parse("#error=access_denied&error_code=otp_expired").is_none());
        assert!(RedirectTokens::parse("access_token=&refresh_token=x").is_none());
    }

    #[test]
    fn bus_delivers_until_unsubscribed() {
        let bus = AuthEventBus::new();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let subscription = bus.subscribe(Rc::new(move |_| counter.set(counter.get() + 1)));

        let event = AuthEvent::new(AuthEventKind::SignedOut, None);
        bus.emit(&event);
        bus.emit(&event);
        assert_eq!(seen.get(), 2);

        subscription.unsubscribe();
        bus.emit(&event);
        assert_eq!(seen.get(), 2);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_during_emit() {
        let bus = AuthEventBus::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let inner = slot.clone();
        let subscription = bus.subscribe(Rc::new(move |_| {
            inner.borrow_mut().take();
        }));
        *slot.borrow_mut() = Some(subscription);

        bus.emit(&AuthEvent::new(AuthEventKind::SignedOut, None));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
