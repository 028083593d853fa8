//! Shared Yew building blocks for the CareNest frontend: browser adapters,
//! the GoTrue auth client, the auth context, the session watchdogs and the
//! component library.

pub mod auth;
pub mod browser;
pub mod components;
pub mod config;
pub mod logging;
pub mod services;

pub use auth::{AuthContext, AuthProvider, use_auth};
pub use components::{SessionErrorMonitor, Spinner, StuckPageEscape, ToastProvider, use_toast};
pub use services::{AppServices, GoTrueClient, ServicesProvider, use_services};
