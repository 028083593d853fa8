//! Client-side validation for the authentication and settings forms

use std::collections::BTreeMap;
use std::fmt;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FullName => "Full name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Password confirmation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Password must contain a letter and a number")]
    PasswordTooWeak,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Per-field validation failures
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, FieldError>);

impl FormErrors {
    fn check(&mut self, field: FormField, result: Result<(), FieldError>) {
        if let Err(error) = result {
            self.0.entry(field).or_insert(error);
        }
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    /// Message for `field`, for rendering under an input
    #[must_use]
    pub fn message(&self, field: FormField) -> Option<String> {
        self.get(field).map(ToString::to_string)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

pub fn validate_required(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    validate_required(email)?;
    if email.contains(char::is_whitespace) {
        return Err(FieldError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(FieldError::InvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
        && !domain.contains('@');
    if local.is_empty() || !domain_ok {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// Presence only; used on the login form so older passwords still work
pub fn validate_password_present(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::Required);
    }
    Ok(())
}

/// Policy for new passwords
pub fn validate_new_password(password: &str) -> Result<(), FieldError> {
    validate_password_present(password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(FieldError::PasswordTooWeak);
    }
    Ok(())
}

pub fn validate_confirmation(password: &str, confirmation: &str) -> Result<(), FieldError> {
    validate_password_present(confirmation)?;
    if password != confirmation {
        return Err(FieldError::PasswordMismatch);
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(FormField::Email, validate_email(&self.email));
        errors.check(FormField::Password, validate_password_present(&self.password));
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(FormField::FullName, validate_required(&self.full_name));
        errors.check(FormField::Email, validate_email(&self.email));
        errors.check(FormField::Password, validate_new_password(&self.password));
        errors.check(
            FormField::ConfirmPassword,
            validate_confirmation(&self.password, &self.confirm_password),
        );
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(FormField::Email, validate_email(&self.email));
        errors.into_result()
    }
}

/// Reset-password and change-password forms
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl NewPasswordForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(FormField::Password, validate_new_password(&self.password));
        errors.check(
            FormField::ConfirmPassword,
            validate_confirmation(&self.password, &self.confirm_password),
        );
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("dr.ruiz@clinic.example").is_ok());
        assert!(validate_email("  patient@mail.com ").is_ok());
        assert_eq!(validate_email(""), Err(FieldError::Required));
        for bad in ["no-at-sign", "@clinic.com", "a@localhost", "a@.com", "a@b..com", "a b@c.com", "a@b@c.com"] {
            assert_eq!(validate_email(bad), Err(FieldError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn new_password_policy() {
        assert_eq!(
            validate_new_password("abc12"),
            Err(FieldError::PasswordTooShort { min: 8 })
        );
        assert_eq!(validate_new_password("abcdefgh"), Err(FieldError::PasswordTooWeak));
        assert_eq!(validate_new_password("12345678"), Err(FieldError::PasswordTooWeak));
        assert!(validate_new_password("therapy2024").is_ok());
    }

    #[test]
    fn login_only_requires_a_password() {
        let form = LoginForm {
            email: "p@clinic.com".into(),
            password: "short".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn signup_reports_every_failing_field() {
        let form = SignUpForm {
            full_name: " ".into(),
            email: "nope".into(),
            password: "therapy2024".into(),
            confirm_password: "therapy2025".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(FormField::FullName), Some(&FieldError::Required));
        assert_eq!(errors.get(FormField::Email), Some(&FieldError::InvalidEmail));
        assert_eq!(
            errors.message(FormField::ConfirmPassword).as_deref(),
            Some("Passwords do not match")
        );
        assert!(errors.get(FormField::Password).is_none());
    }

    #[test]
    fn new_password_form_requires_confirmation() {
        let form = NewPasswordForm {
            password: "therapy2024".into(),
            confirm_password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(FormField::ConfirmPassword), Some(&FieldError::Required));
        assert_eq!(
            errors.to_string(),
            "Password confirmation: This field is required"
        );
    }
}
