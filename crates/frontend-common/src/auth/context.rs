//! Global authentication context and provider

use crate::browser::now_secs;
use crate::services::{REFRESH_MARGIN_SECS, use_services};
use carenest_core::{AuthClient, AuthEvent, AuthEventKind, AuthListener, Session, User};
use gloo::timers::callback::Timeout;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Authentication context data
#[derive(Clone, Debug, PartialEq)]
pub struct AuthContextData {
    pub session: Option<Session>,
    pub is_loading: bool,
    /// Set while the user arrived through a password-recovery link
    pub recovering_password: bool,
}

/// Authentication context actions
pub enum AuthAction {
    /// Result of the initial `get_session`
    Restore(Option<Session>),
    /// Anything the auth client broadcast
    Event(AuthEvent),
}

/// Authentication context
pub type AuthContext = UseReducerHandle<AuthContextData>;

impl Default for AuthContextData {
    fn default() -> Self {
        Self {
            session: None,
            is_loading: true,
            recovering_password: false,
        }
    }
}

impl AuthContextData {
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

impl Reducible for AuthContextData {
    type Action = AuthAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            AuthAction::Restore(session) => Rc::new(Self {
                session,
                is_loading: false,
                ..(*self).clone()
            }),
            // A failed refresh keeps whatever session the pages already show.
            AuthAction::Event(event) if event.is_empty_refresh() => self,
            AuthAction::Event(event) => {
                let recovering_password = match event.kind {
                    AuthEventKind::PasswordRecovery => true,
                    AuthEventKind::SignedOut | AuthEventKind::UserUpdated => false,
                    _ => self.recovering_password,
                };
                Rc::new(Self {
                    session: event.session,
                    is_loading: false,
                    recovering_password,
                })
            }
        }
    }
}

/// Longest delay `setTimeout` honours
const MAX_TIMER_MS: u32 = 2_147_483_647;

/// Milliseconds until the session should be refreshed, `None` without an expiry
fn refresh_delay_ms(session: &Session, now: i64) -> Option<u32> {
    let expires_at = session.expires_at?;
    let secs = (expires_at - REFRESH_MARGIN_SECS - now).max(0);
    Some(
        u32::try_from(secs.saturating_mul(1000))
            .unwrap_or(MAX_TIMER_MS)
            .min(MAX_TIMER_MS),
    )
}

/// Auth provider props
#[derive(Properties, PartialEq)]
pub struct AuthProviderProps {
    pub children: Children,
}

/// Auth provider component
#[function_component(AuthProvider)]
pub fn auth_provider(props: &AuthProviderProps) -> Html {
    let services = use_services();
    let auth_state = use_reducer(AuthContextData::default);

    // Follow the auth client and restore the stored session on mount
    {
        let auth_state = auth_state.clone();
        let client = services.client.clone();
        use_effect_with((), move |_| {
            let dispatcher = auth_state.dispatcher();
            let listener: AuthListener = Rc::new(move |event: &AuthEvent| {
                dispatcher.dispatch(AuthAction::Event(event.clone()));
            });
            let subscription = client.subscribe(listener);

            let dispatcher = auth_state.dispatcher();
            spawn_local(async move {
                let session = match client.get_session().await {
                    Ok(session) => session,
                    Err(error) => {
                        warn!(%error, "Could not restore session");
                        None
                    }
                };
                dispatcher.dispatch(AuthAction::Restore(session));
            });

            move || drop(subscription)
        });
    }

    // Refresh shortly before the access token expires
    {
        let client = services.client.clone();
        use_effect_with(auth_state.session.clone(), move |session| {
            let timer = session.as_ref().and_then(|session| {
                let delay = refresh_delay_ms(session, now_secs())?;
                debug!(delay_ms = delay, "Scheduling session refresh");
                let session = session.clone();
                Some(Timeout::new(delay, move || {
                    spawn_local(async move {
                        // Failures are broadcast as an empty refresh.
                        let _ = client.refresh_session(&session).await;
                    });
                }))
            });

            move || drop(timer)
        });
    }

    html! {
        <ContextProvider<AuthContext> context={auth_state}>
            {props.children.clone()}
        </ContextProvider<AuthContext>>
    }
}

/// Hook to use auth context
#[hook]
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>()
        .expect("AuthContext not found. Make sure to wrap your component with AuthProvider")
}

/// Hook to get the current session
#[hook]
pub fn use_session() -> Option<Session> {
    let auth = use_auth();
    auth.session.clone()
}

/// Hook to check if authenticated
#[hook]
pub fn use_is_authenticated() -> bool {
    let auth = use_auth();
    auth.session.is_some()
}
