//! Test doubles for the injectable seams
//!
//! Enabled for this crate's own tests and, through the `tests` feature, for
//! downstream crates that want to drive the watchdogs without a browser.

use crate::auth::{
    AuthClient, AuthError, AuthEvent, AuthEventBus, AuthListener, Session, SignUpRequest,
    Subscription, User,
};
use crate::monitor::Spawner;
use crate::navigation::{NavigationError, Navigator};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A session for `user_id` expiring far in the future
#[must_use]
pub fn session_for(user_id: &str) -> Session {
    Session {
        access_token: format!("access-{user_id}"),
        refresh_token: format!("refresh-{user_id}"),
        token_type: "bearer".to_string(),
        expires_in: Some(3600),
        expires_at: Some(4_102_444_800),
        user: User {
            id: user_id.to_string(),
            email: Some(format!("{user_id}@example.com")),
            user_metadata: serde_json::Value::Null,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCall {
    Push(String),
    Refresh,
    Reload(String),
}

/// Navigator that records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    calls: RefCell<Vec<NavigationCall>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn calls(&self) -> Vec<NavigationCall> {
        self.calls.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: &str) -> Result<(), NavigationError> {
        self.calls
            .borrow_mut()
            .push(NavigationCall::Push(route.to_string()));
        Ok(())
    }

    fn refresh(&self) {
        self.calls.borrow_mut().push(NavigationCall::Refresh);
    }

    fn reload_document(&self, path: &str) -> Result<(), NavigationError> {
        self.calls
            .borrow_mut()
            .push(NavigationCall::Reload(path.to_string()));
        Ok(())
    }
}

/// Auth client whose events are emitted by the test
pub struct FakeAuthClient {
    bus: Rc<AuthEventBus>,
    session_result: RefCell<Result<Option<Session>, AuthError>>,
    sign_out_result: RefCell<Result<(), AuthError>>,
    sign_outs: Cell<usize>,
}

impl Default for FakeAuthClient {
    fn default() -> Self {
        Self {
            bus: AuthEventBus::new(),
            session_result: RefCell::new(Ok(None)),
            sign_out_result: RefCell::new(Ok(())),
            sign_outs: Cell::new(0),
        }
    }
}

impl FakeAuthClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What the next `get_session` calls return
    pub fn set_session_result(&self, result: Result<Option<Session>, AuthError>) {
        *self.session_result.borrow_mut() = result;
    }

    pub fn set_sign_out_result(&self, result: Result<(), AuthError>) {
        *self.sign_out_result.borrow_mut() = result;
    }

    pub fn emit(&self, event: &AuthEvent) {
        self.bus.emit(event);
    }

    #[must_use]
    pub fn sign_outs(&self) -> usize {
        self.sign_outs.get()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

#[async_trait(?Send)]
impl AuthClient for FakeAuthClient {
    fn subscribe(&self, listener: AuthListener) -> Subscription {
        self.bus.subscribe(listener)
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        self.session_result.borrow().clone()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        self.sign_out_result.borrow().clone()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Session, AuthError> {
        Ok(session_for(email))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError> {
        Ok(Some(session_for(&request.email)))
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        _redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn update_password(&self, _password: &str) -> Result<User, AuthError> {
        Ok(session_for("fake").user)
    }
}

/// Collects spawned tasks so tests decide when they run
#[derive(Default)]
pub struct TaskQueue {
    pending: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn spawner(self: &Rc<Self>) -> Spawner {
        let queue = self.clone();
        Rc::new(move |task: LocalBoxFuture<'static, ()>| {
            queue.pending.borrow_mut().push(task);
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Run queued tasks, including any they spawn, until none remain
    pub async fn drain(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.pending.borrow_mut());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task.await;
            }
        }
    }
}
