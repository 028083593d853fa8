//! User-friendly error message mappings

use carenest_core::AuthError;

/// Convert an auth failure into something a patient or psychologist can act on
pub fn user_friendly_error(error: &AuthError) -> String {
    match error {
        AuthError::InvalidRefreshToken(_) | AuthError::SessionMissing => {
            "Your session has expired. Please sign in again.".to_string()
        }
        AuthError::Network(_) => {
            "We couldn't reach the server. Check your connection and try again.".to_string()
        }
        AuthError::Api { status: 429, .. } => {
            "Too many attempts. Please wait a moment and try again.".to_string()
        }
        AuthError::Api { message, .. } => api_message(message),
        AuthError::Unexpected(_) => "Something went wrong. Please try again.".to_string(),
    }
}

fn api_message(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid login credentials") {
        "Incorrect email or password.".to_string()
    } else if lower.contains("email not confirmed") {
        "Please confirm your email address before signing in.".to_string()
    } else if lower.contains("already registered") {
        "An account with this email already exists.".to_string()
    } else if lower.contains("same password") || lower.contains("different from the old") {
        "Your new password must be different from the current one.".to_string()
    } else if message.trim().is_empty() {
        "Something went wrong. Please try again.".to_string()
    } else {
        // The service's own wording is already readable for everything else.
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> AuthError {
        AuthError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn credentials_error_is_rephrased() {
        assert_eq!(
            user_friendly_error(&api(400, "Invalid login credentials")),
            "Incorrect email or password."
        );
    }

    #[test]
    fn rate_limit_wins_over_message() {
        assert!(user_friendly_error(&api(429, "email rate limit exceeded")).starts_with("Too many"));
    }

    #[test]
    fn unknown_api_message_passes_through() {
        assert_eq!(
            user_friendly_error(&api(422, "Signups not allowed for this instance")),
            "Signups not allowed for this instance"
        );
    }

    #[test]
    fn expired_session_asks_to_sign_in() {
        let message = user_friendly_error(&AuthError::InvalidRefreshToken("gone".to_string()));
        assert!(message.contains("sign in again"));
    }
}
