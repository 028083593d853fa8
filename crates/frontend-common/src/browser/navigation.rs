//! Router and `window.location` backed navigation

use super::describe_js;
use carenest_core::{NavigationError, Navigator};
use yew::Callback;
use yew_router::AnyRoute;

/// Navigates through the yew router when one is mounted, otherwise through
/// `window.location`
#[derive(Clone, Default)]
pub struct BrowserNavigator {
    router: Option<yew_router::navigator::Navigator>,
    on_refresh: Option<Callback<()>>,
}

impl BrowserNavigator {
    pub fn new(router: Option<yew_router::navigator::Navigator>) -> Self {
        Self {
            router,
            on_refresh: None,
        }
    }

    /// Callback asked to re-fetch route data after a client-side redirect
    #[must_use]
    pub fn with_refresh(mut self, on_refresh: Callback<()>) -> Self {
        self.on_refresh = Some(on_refresh);
        self
    }

    fn location() -> Result<web_sys::Location, NavigationError> {
        web_sys::window()
            .map(|w| w.location())
            .ok_or_else(|| NavigationError::RouterUnavailable("no window".to_string()))
    }
}

impl Navigator for BrowserNavigator {
    fn push(&self, route: &str) -> Result<(), NavigationError> {
        match &self.router {
            Some(router) => {
                router.push(&AnyRoute::new(route));
                Ok(())
            }
            None => {
                tracing::debug!(route, "No router mounted, assigning location");
                Self::location()?
                    .assign(route)
                    .map_err(|e| NavigationError::Failed(describe_js(&e)))
            }
        }
    }

    fn refresh(&self) {
        if let Some(on_refresh) = &self.on_refresh {
            on_refresh.emit(());
        }
    }

    fn reload_document(&self, path: &str) -> Result<(), NavigationError> {
        Self::location()?
            .set_href(path)
            .map_err(|e| NavigationError::Failed(describe_js(&e)))
    }
}
