//! Automatic recovery from a session the auth service can no longer refresh
//!
//! A broken refresh token rarely surfaces as an error a page can catch. What
//! does show up is a run of `TOKEN_REFRESHED` events carrying no session. One
//! of those can be a race with a legitimate sign-out; `failure_threshold`
//! consecutive ones are treated as corruption and trigger a [`SessionWipe`].

use crate::auth::{AuthClient, AuthError, AuthEvent, AuthListener, Session, Subscription};
use crate::config::GuardConfig;
use crate::navigation::WipeTarget;
use crate::wipe::{SessionWipe, WipeReport};
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Runs a task on the local event loop (`wasm_bindgen_futures::spawn_local` in the browser)
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Consecutive refreshes that came back without a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounter(u32);

impl FailureCounter {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Apply one event and return the new count
    pub fn observe(&mut self, event: &AuthEvent) -> u32 {
        if event.has_session() {
            self.0 = 0;
        } else if event.is_empty_refresh() {
            self.0 = self.0.saturating_add(1);
        }
        self.0
    }
}

/// What the monitor concluded from one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing relevant to session health
    Ignored,
    /// A valid session arrived; the streak is broken
    Reset,
    /// An empty refresh below the threshold
    Recorded { failures: u32 },
    /// Recovery must run now
    Trip,
    /// Recovery already ran for this mount
    Inert,
}

/// Watches auth events and the initial session check for corruption
pub struct SessionErrorMonitor {
    auth: Rc<dyn AuthClient>,
    wipe: SessionWipe,
    threshold: u32,
    login_route: String,
    counter: Cell<FailureCounter>,
    tripped: Cell<bool>,
}

impl SessionErrorMonitor {
    #[must_use]
    pub fn new(auth: Rc<dyn AuthClient>, wipe: SessionWipe, config: &GuardConfig) -> Rc<Self> {
        Rc::new(Self {
            auth,
            wipe,
            threshold: config.failure_threshold.max(1),
            login_route: config.login_route.clone(),
            counter: Cell::new(FailureCounter::default()),
            tripped: Cell::new(false),
        })
    }

    #[must_use]
    pub fn failures(&self) -> u32 {
        self.counter.get().get()
    }

    /// Whether recovery has been triggered for this mount
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.get()
    }

    // Latches; only the first caller gets `true`.
    fn trip(&self) -> bool {
        !self.tripped.replace(true)
    }

    /// Update the failure count for one event, in delivery order
    pub fn observe(&self, event: &AuthEvent) -> Verdict {
        if self.tripped.get() {
            return Verdict::Inert;
        }

        let mut counter = self.counter.get();
        let failures = counter.observe(event);
        self.counter.set(counter);

        if event.has_session() {
            return Verdict::Reset;
        }
        if !event.is_empty_refresh() {
            return Verdict::Ignored;
        }

        if failures >= self.threshold {
            warn!(
                failures,
                threshold = self.threshold,
                "Repeated token refresh failures, treating session as corrupted"
            );
            if self.trip() {
                return Verdict::Trip;
            }
            return Verdict::Inert;
        }

        debug!(failures, threshold = self.threshold, "Token refresh returned no session");
        Verdict::Recorded { failures }
    }

    /// Classify the result of the mount-time session check
    ///
    /// Only a rejected refresh token counts. Anything else is logged and
    /// ignored so a flaky network never wipes a healthy session.
    pub fn assess_session_check(&self, result: &Result<Option<Session>, AuthError>) -> Verdict {
        match result {
            Err(error) if error.is_invalid_refresh_token() => {
                warn!(%error, "Stored refresh token rejected, recovering immediately");
                if self.trip() {
                    Verdict::Trip
                } else {
                    Verdict::Inert
                }
            }
            Err(error) => {
                warn!(%error, "Session check failed, continuing without recovery");
                Verdict::Ignored
            }
            Ok(_) => Verdict::Ignored,
        }
    }

    /// Wipe local state and route to login
    pub async fn recover(&self) -> WipeReport {
        info!(route = %self.login_route, "Recovering from corrupted session");
        self.wipe
            .run(&WipeTarget::ClientRoute(self.login_route.clone()))
            .await
    }

    /// Observe one event and recover if it tripped the monitor
    pub async fn handle_event(&self, event: &AuthEvent) -> Option<WipeReport> {
        match self.observe(event) {
            Verdict::Trip => Some(self.recover().await),
            _ => None,
        }
    }

    /// Run the mount-time session check and recover on a rejected refresh token
    pub async fn check_session(&self) -> Option<WipeReport> {
        let result = self.auth.get_session().await;
        match self.assess_session_check(&result) {
            Verdict::Trip => Some(self.recover().await),
            _ => None,
        }
    }

    /// Subscribe to auth events and start the session check
    ///
    /// Counting happens inside the subscription callback so it follows
    /// delivery order; the wipe itself is handed to `spawn`. Dropping the
    /// returned handle unsubscribes.
    pub fn mount(self: &Rc<Self>, spawn: &Spawner) -> MonitorHandle {
        let listener: AuthListener = {
            let monitor = self.clone();
            let spawn = spawn.clone();
            Rc::new(move |event: &AuthEvent| {
                if monitor.observe(event) == Verdict::Trip {
                    let monitor = monitor.clone();
                    spawn(Box::pin(async move {
                        monitor.recover().await;
                    }));
                }
            })
        };
        let subscription = self.auth.subscribe(listener);

        let monitor = self.clone();
        spawn(Box::pin(async move {
            monitor.check_session().await;
        }));

        MonitorHandle {
            _subscription: subscription,
        }
    }
}

/// Keeps the monitor subscribed while alive
#[must_use = "dropping the handle unmounts the monitor"]
#[derive(Debug)]
pub struct MonitorHandle {
    _subscription: Subscription,
}

impl MonitorHandle {
    pub fn unmount(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthEventKind;
    use crate::auth::mock::MockAuthClient;
    use crate::storage::{CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore};
    use crate::testing::{
        FakeAuthClient, NavigationCall, RecordingNavigator, TaskQueue, session_for,
    };

    fn empty_refresh() -> AuthEvent {
        AuthEvent::new(AuthEventKind::TokenRefreshed, None)
    }

    fn with_session(kind: AuthEventKind) -> AuthEvent {
        AuthEvent::new(kind, Some(session_for("patient-7")))
    }

    struct Harness {
        auth: Rc<FakeAuthClient>,
        local: Rc<MemoryStore>,
        session: Rc<MemoryStore>,
        cookies: Rc<MemoryCookieJar>,
        navigator: Rc<RecordingNavigator>,
        monitor: Rc<SessionErrorMonitor>,
        tasks: Rc<TaskQueue>,
    }

    impl Harness {
        fn new() -> Self {
            let auth = Rc::new(FakeAuthClient::new());
            let local = Rc::new(MemoryStore::with_entries([("carenest.auth.session", "{}")]));
            let session = Rc::new(MemoryStore::with_entries([("draft", "1")]));
            let cookies = Rc::new(MemoryCookieJar::new());
            cookies.insert("sb-access-token", "a");
            let navigator = Rc::new(RecordingNavigator::default());
            let wipe = SessionWipe::new(
                auth.clone(),
                local.clone(),
                session.clone(),
                cookies.clone(),
                navigator.clone(),
            );
            let monitor = SessionErrorMonitor::new(auth.clone(), wipe, &GuardConfig::default());
            Self {
                auth,
                local,
                session,
                cookies,
                navigator,
                monitor,
                tasks: TaskQueue::new(),
            }
        }

        fn login_redirects(&self) -> usize {
            self.navigator
                .calls()
                .iter()
                .filter(|call| **call == NavigationCall::Push("/login".into()))
                .count()
        }
    }

    #[test]
    fn counter_tracks_trailing_empty_refreshes() {
        let mut counter = FailureCounter::default();
        let events = [
            empty_refresh(),
            empty_refresh(),
            with_session(AuthEventKind::SignedIn),
            AuthEvent::new(AuthEventKind::SignedOut, None),
            empty_refresh(),
            AuthEvent::new(AuthEventKind::UserUpdated, None),
            empty_refresh(),
        ];
        let counts: Vec<u32> = events.iter().map(|e| counter.observe(e)).collect();
        assert_eq!(counts, vec![1, 2, 0, 0, 1, 1, 2]);
    }

    #[test]
    fn refreshed_with_session_resets_counter() {
        let mut counter = FailureCounter::default();
        counter.observe(&empty_refresh());
        assert_eq!(counter.observe(&with_session(AuthEventKind::TokenRefreshed)), 0);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn counter_matches_streak_for_many_sequences() {
        // Enumerate every event sequence of length 6 over three event shapes.
        let shapes = [
            empty_refresh(),
            with_session(AuthEventKind::TokenRefreshed),
            AuthEvent::new(AuthEventKind::SignedOut, None),
        ];
        for code in 0..3_u32.pow(6) {
            let mut digits = code;
            let sequence: Vec<&AuthEvent> = (0..6)
                .map(|_| {
                    let shape = &shapes[(digits % 3) as usize];
                    digits /= 3;
                    shape
                })
                .collect();

            let mut counter = FailureCounter::default();
            for event in &sequence {
                counter.observe(event);
            }

            let since_reset = sequence
                .iter()
                .rposition(|e| e.has_session())
                .map_or(&sequence[..], |i| &sequence[i + 1..]);
            let expected = since_reset.iter().filter(|e| e.is_empty_refresh()).count();
            assert_eq!(counter.get() as usize, expected, "sequence {code}");
        }
    }

    #[test]
    fn verdicts_follow_threshold() {
        let harness = Harness::new();
        let monitor = &harness.monitor;

        assert_eq!(
            monitor.observe(&AuthEvent::new(AuthEventKind::SignedOut, None)),
            Verdict::Ignored
        );
        assert_eq!(
            monitor.observe(&empty_refresh()),
            Verdict::Recorded { failures: 1 }
        );
        assert_eq!(monitor.observe(&empty_refresh()), Verdict::Trip);
        assert!(monitor.is_tripped());
        assert_eq!(monitor.observe(&empty_refresh()), Verdict::Inert);
        assert_eq!(
            monitor.observe(&with_session(AuthEventKind::SignedIn)),
            Verdict::Inert
        );
    }

    #[tokio::test]
    async fn two_empty_refreshes_wipe_once_and_redirect() {
        let harness = Harness::new();
        let handle = harness.monitor.mount(&harness.tasks.spawner());
        harness.tasks.drain().await;

        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;
        assert_eq!(harness.auth.sign_outs(), 0);

        harness.auth.emit(&empty_refresh());
        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;

        assert_eq!(harness.auth.sign_outs(), 1);
        assert_eq!(harness.login_redirects(), 1);
        assert_eq!(
            harness.navigator.calls(),
            vec![NavigationCall::Push("/login".into()), NavigationCall::Refresh]
        );
        assert!(harness.local.is_empty().unwrap());
        assert!(harness.session.is_empty().unwrap());
        assert!(harness.cookies.names().unwrap().is_empty());
        drop(handle);
    }

    #[tokio::test]
    async fn valid_session_between_failures_prevents_wipe() {
        let harness = Harness::new();
        let _handle = harness.monitor.mount(&harness.tasks.spawner());

        harness.auth.emit(&empty_refresh());
        harness.auth.emit(&with_session(AuthEventKind::TokenRefreshed));
        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;

        assert_eq!(harness.auth.sign_outs(), 0);
        assert!(harness.navigator.calls().is_empty());
        assert_eq!(harness.monitor.failures(), 1);
        assert!(!harness.local.is_empty().unwrap());
    }

    #[tokio::test]
    async fn invalid_refresh_token_on_mount_wipes_immediately() {
        let harness = Harness::new();
        harness.auth.set_session_result(Err(AuthError::from_api(
            400,
            "Invalid Refresh Token: Refresh Token Not Found",
        )));

        let _handle = harness.monitor.mount(&harness.tasks.spawner());
        harness.tasks.drain().await;

        assert_eq!(harness.monitor.failures(), 0);
        assert_eq!(harness.auth.sign_outs(), 1);
        assert_eq!(harness.login_redirects(), 1);

        // Later failures do nothing more.
        harness.auth.emit(&empty_refresh());
        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;
        assert_eq!(harness.auth.sign_outs(), 1);
    }

    #[tokio::test]
    async fn unrelated_check_failure_is_swallowed() {
        let harness = Harness::new();
        harness
            .auth
            .set_session_result(Err(AuthError::Network("failed to fetch".into())));

        let _handle = harness.monitor.mount(&harness.tasks.spawner());
        harness.tasks.drain().await;

        assert!(!harness.monitor.is_tripped());
        assert_eq!(harness.auth.sign_outs(), 0);
        assert!(harness.navigator.calls().is_empty());
    }

    #[tokio::test]
    async fn unmount_unsubscribes() {
        let harness = Harness::new();
        let handle = harness.monitor.mount(&harness.tasks.spawner());
        assert_eq!(harness.auth.subscriber_count(), 1);

        handle.unmount();
        assert_eq!(harness.auth.subscriber_count(), 0);

        harness.auth.emit(&empty_refresh());
        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;
        assert_eq!(harness.auth.sign_outs(), 0);
    }

    #[tokio::test]
    async fn wipe_proceeds_when_sign_out_rejects() {
        let harness = Harness::new();
        harness
            .auth
            .set_sign_out_result(Err(AuthError::Network("offline".into())));
        let _handle = harness.monitor.mount(&harness.tasks.spawner());

        harness.auth.emit(&empty_refresh());
        harness.auth.emit(&empty_refresh());
        harness.tasks.drain().await;

        assert!(harness.local.is_empty().unwrap());
        assert!(harness.cookies.names().unwrap().is_empty());
        assert_eq!(harness.login_redirects(), 1);
    }

    #[tokio::test]
    async fn handle_event_uses_injected_mock() {
        let mut auth = MockAuthClient::new();
        auth.expect_sign_out().times(1).returning(|| Ok(()));
        let navigator = Rc::new(RecordingNavigator::default());
        let auth: Rc<dyn AuthClient> = Rc::new(auth);
        let wipe = SessionWipe::new(
            auth.clone(),
            Rc::new(MemoryStore::new()),
            Rc::new(MemoryStore::new()),
            Rc::new(MemoryCookieJar::new()),
            navigator.clone(),
        );
        let config = GuardConfig {
            failure_threshold: 3,
            login_route: "/signin".into(),
            ..GuardConfig::default()
        };
        let monitor = SessionErrorMonitor::new(auth, wipe, &config);

        assert!(monitor.handle_event(&empty_refresh()).await.is_none());
        assert!(monitor.handle_event(&empty_refresh()).await.is_none());
        let report = monitor.handle_event(&empty_refresh()).await;

        assert!(report.is_some_and(|r| r.is_clean()));
        assert_eq!(
            navigator.calls(),
            vec![NavigationCall::Push("/signin".into()), NavigationCall::Refresh]
        );
    }
}
