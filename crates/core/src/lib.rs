//! CareNest core: session recovery, form validation and configuration
//!
//! Everything here is platform independent. Browser access goes through the
//! traits in [`auth`], [`storage`] and [`navigation`]; the Yew crates supply
//! the web implementations.

pub mod auth;
pub mod config;
pub mod error;
pub mod escape;
pub mod forms;
pub mod monitor;
pub mod navigation;
pub mod session_store;
pub mod storage;
pub mod validation;
pub mod wipe;

#[cfg(any(test, feature = "tests"))]
pub mod testing;

pub use auth::{
    AuthClient, AuthError, AuthEvent, AuthEventBus, AuthEventKind, AuthListener, RedirectTokens,
    Session, SignUpRequest, Subscription, User,
};
pub use config::{AppConfig, GuardConfig};
pub use error::{CoreError, CoreResult};
pub use escape::{EscapePhase, StuckPageEscape};
pub use monitor::{FailureCounter, MonitorHandle, SessionErrorMonitor, Spawner, Verdict};
pub use navigation::{NavigationError, Navigator, WipeTarget};
pub use session_store::SessionStore;
pub use storage::{CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore, StoreError};
pub use wipe::{SessionWipe, WipeReport, WipeStep, WipeStepError};
