//! Authentication module

pub mod context;
pub mod error_messages;

pub use context::{
    AuthAction, AuthContext, AuthContextData, AuthProvider, use_auth, use_is_authenticated,
    use_session,
};
pub use error_messages::user_friendly_error;
