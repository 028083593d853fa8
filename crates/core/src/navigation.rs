//! Navigation seam used after a session wipe

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Router unavailable: {0}")]
    RouterUnavailable(String),

    #[error("Navigation failed: {0}")]
    Failed(String),
}

/// Moves the user somewhere else once local state is gone
pub trait Navigator {
    /// Client-side route change, keeping the running application
    fn push(&self, route: &str) -> Result<(), NavigationError>;

    /// Re-fetch data that depends on the current route
    fn refresh(&self);

    /// Throw away the running application and load `path` from scratch
    fn reload_document(&self, path: &str) -> Result<(), NavigationError>;
}

/// Where a wipe leaves the user
///
/// The automatic path keeps the router; the manual escape hatch reloads the
/// whole document because in-memory state may be what is broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WipeTarget {
    ClientRoute(String),
    DocumentReload(String),
}

impl WipeTarget {
    pub(crate) fn navigate(&self, navigator: &dyn Navigator) -> Result<(), NavigationError> {
        match self {
            Self::ClientRoute(route) => {
                navigator.push(route)?;
                navigator.refresh();
                Ok(())
            }
            Self::DocumentReload(path) => navigator.reload_document(path),
        }
    }
}

impl fmt::Display for WipeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientRoute(route) => write!(f, "route {route}"),
            Self::DocumentReload(path) => write!(f, "reload {path}"),
        }
    }
}
