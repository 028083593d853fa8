//! Unconditional return to a logged-out, storage-clean client
//!
//! Every step runs even when an earlier one fails. Failures are logged and
//! collected in the [`WipeReport`] instead of being returned as an error, so a
//! hanging or broken sign-out endpoint can never keep credentials on disk.

use crate::auth::{AuthClient, AuthError};
use crate::navigation::{NavigationError, Navigator, WipeTarget};
use crate::storage::{CookieJar, KeyValueStore, StoreError};
use std::fmt;
use std::rc::Rc;
use tracing::{info, warn};

/// One step of the wipe sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WipeStep {
    SignOut,
    LocalStorage,
    SessionStorage,
    Cookies,
    Navigation,
}

impl fmt::Display for WipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SignOut => "sign_out",
            Self::LocalStorage => "local_storage",
            Self::SessionStorage => "session_storage",
            Self::Cookies => "cookies",
            Self::Navigation => "navigation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WipeStepError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cookie {name}: {source}")]
    Cookie { name: String, source: StoreError },

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Outcome of each wipe step
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WipeReport {
    failures: Vec<(WipeStep, WipeStepError)>,
    cookies_expired: usize,
}

impl WipeReport {
    fn record(&mut self, step: WipeStep, result: Result<(), WipeStepError>) {
        if let Err(error) = result {
            warn!(%step, %error, "Session wipe step failed");
            self.failures.push((step, error));
        }
    }

    #[must_use]
    pub fn succeeded(&self, step: WipeStep) -> bool {
        !self.failures.iter().any(|(failed, _)| *failed == step)
    }

    /// True when no step failed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[(WipeStep, WipeStepError)] {
        &self.failures
    }

    #[must_use]
    pub const fn cookies_expired(&self) -> usize {
        self.cookies_expired
    }
}

/// Everything a wipe touches
#[derive(Clone)]
pub struct SessionWipe {
    auth: Rc<dyn AuthClient>,
    local_storage: Rc<dyn KeyValueStore>,
    session_storage: Rc<dyn KeyValueStore>,
    cookies: Rc<dyn CookieJar>,
    navigator: Rc<dyn Navigator>,
}

impl SessionWipe {
    pub fn new(
        auth: Rc<dyn AuthClient>,
        local_storage: Rc<dyn KeyValueStore>,
        session_storage: Rc<dyn KeyValueStore>,
        cookies: Rc<dyn CookieJar>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            local_storage,
            session_storage,
            cookies,
            navigator,
        }
    }

    /// Sign out, clear both storage areas, expire cookies, then navigate
    pub async fn run(&self, target: &WipeTarget) -> WipeReport {
        info!(%target, "Wiping local session state");
        let mut report = WipeReport::default();

        let signed_out = self.auth.sign_out().await.map_err(WipeStepError::from);
        report.record(WipeStep::SignOut, signed_out);

        report.record(
            WipeStep::LocalStorage,
            self.local_storage.clear().map_err(WipeStepError::from),
        );
        report.record(
            WipeStep::SessionStorage,
            self.session_storage.clear().map_err(WipeStepError::from),
        );

        let cookies = self.expire_cookies(&mut report);
        report.record(WipeStep::Cookies, cookies);

        report.record(
            WipeStep::Navigation,
            target
                .navigate(self.navigator.as_ref())
                .map_err(WipeStepError::from),
        );

        info!(
            clean = report.is_clean(),
            cookies_expired = report.cookies_expired,
            "Session wipe finished"
        );
        report
    }

    // Keeps going past a cookie that refuses to expire; the first failure is reported.
    fn expire_cookies(&self, report: &mut WipeReport) -> Result<(), WipeStepError> {
        let names = self.cookies.names()?;
        let mut first_error = None;
        for name in names {
            match self.cookies.expire(&name) {
                Ok(()) => report.cookies_expired += 1,
                Err(source) => {
                    first_error.get_or_insert(WipeStepError::Cookie { name, source });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mock::MockAuthClient;
    use crate::storage::{MemoryCookieJar, MemoryStore, expired_cookie};
    use crate::testing::{NavigationCall, RecordingNavigator};

    struct Fixture {
        local: Rc<MemoryStore>,
        session: Rc<MemoryStore>,
        cookies: Rc<MemoryCookieJar>,
        navigator: Rc<RecordingNavigator>,
    }

    impl Fixture {
        fn populated() -> Self {
            let cookies = MemoryCookieJar::new();
            cookies.insert("sb-access-token", "a");
            cookies.insert("sb-refresh-token", "r");
            Self {
                local: Rc::new(MemoryStore::with_entries([
                    ("carenest.auth.session", "{}"),
                    ("theme", "dark"),
                ])),
                session: Rc::new(MemoryStore::with_entries([("draft", "x")])),
                cookies: Rc::new(cookies),
                navigator: Rc::new(RecordingNavigator::default()),
            }
        }

        fn empty() -> Self {
            Self {
                local: Rc::new(MemoryStore::new()),
                session: Rc::new(MemoryStore::new()),
                cookies: Rc::new(MemoryCookieJar::new()),
                navigator: Rc::new(RecordingNavigator::default()),
            }
        }

        fn wipe(&self, auth: MockAuthClient) -> SessionWipe {
            SessionWipe::new(
                Rc::new(auth),
                self.local.clone(),
                self.session.clone(),
                self.cookies.clone(),
                self.navigator.clone(),
            )
        }
    }

    fn auth_signing_out(result: Result<(), AuthError>) -> MockAuthClient {
        let mut auth = MockAuthClient::new();
        auth.expect_sign_out()
            .times(1)
            .returning(move || result.clone());
        auth
    }

    #[tokio::test]
    async fn wipe_clears_everything_and_routes_to_login() {
        let fixture = Fixture::populated();
        let wipe = fixture.wipe(auth_signing_out(Ok(())));

        let report = wipe.run(&WipeTarget::ClientRoute("/login".into())).await;

        assert!(report.is_clean());
        assert_eq!(report.cookies_expired(), 2);
        assert!(fixture.local.is_empty().unwrap());
        assert!(fixture.session.is_empty().unwrap());
        assert!(fixture.cookies.names().unwrap().is_empty());
        assert!(fixture
            .cookies
            .writes()
            .contains(&expired_cookie("sb-refresh-token")));
        assert_eq!(
            fixture.navigator.calls(),
            vec![NavigationCall::Push("/login".into()), NavigationCall::Refresh]
        );
    }

    #[tokio::test]
    async fn failing_sign_out_still_clears_local_state() {
        let fixture = Fixture::populated();
        let wipe = fixture.wipe(auth_signing_out(Err(AuthError::Network(
            "connection reset".into(),
        ))));

        let report = wipe.run(&WipeTarget::DocumentReload("/".into())).await;

        assert!(!report.succeeded(WipeStep::SignOut));
        assert!(report.succeeded(WipeStep::LocalStorage));
        assert!(report.succeeded(WipeStep::SessionStorage));
        assert!(report.succeeded(WipeStep::Cookies));
        assert_eq!(report.failures().len(), 1);
        assert!(fixture.local.is_empty().unwrap());
        assert!(fixture.session.is_empty().unwrap());
        assert!(fixture.cookies.names().unwrap().is_empty());
        assert_eq!(
            fixture.navigator.calls(),
            vec![NavigationCall::Reload("/".into())]
        );
    }

    #[tokio::test]
    async fn wiping_empty_state_is_clean() {
        let fixture = Fixture::empty();
        let mut auth = MockAuthClient::new();
        auth.expect_sign_out().times(2).returning(|| Ok(()));
        let wipe = fixture.wipe(auth);

        let first = wipe.run(&WipeTarget::ClientRoute("/login".into())).await;
        let second = wipe.run(&WipeTarget::ClientRoute("/login".into())).await;

        assert!(first.is_clean());
        assert!(second.is_clean());
        assert_eq!(second.cookies_expired(), 0);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("sessionStorage disabled".into()))
        }
        fn len(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn storage_failure_does_not_skip_later_steps() {
        let fixture = Fixture::populated();
        let wipe = SessionWipe::new(
            Rc::new(auth_signing_out(Ok(()))),
            fixture.local.clone(),
            Rc::new(BrokenStore),
            fixture.cookies.clone(),
            fixture.navigator.clone(),
        );

        let report = wipe.run(&WipeTarget::ClientRoute("/login".into())).await;

        assert!(!report.succeeded(WipeStep::SessionStorage));
        assert!(fixture.local.is_empty().unwrap());
        assert!(fixture.cookies.names().unwrap().is_empty());
        assert_eq!(fixture.navigator.calls().len(), 2);
    }
}
