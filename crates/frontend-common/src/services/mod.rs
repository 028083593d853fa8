//! Service layer shared by every page

pub mod auth;
mod context;

pub use auth::{GoTrueClient, REFRESH_MARGIN_SECS};
pub use context::{AppServices, ServicesProvider, use_services};
