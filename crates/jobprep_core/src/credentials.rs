//! crates/jobprep_core/src/credentials.rs
//!
//! Login and registration form validation.

use std::sync::OnceLock;

use regex::Regex;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"))
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Required only when registering.
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.messages().join("; "))]
pub struct LoginFormErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
}

impl LoginFormErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.username.is_none()
    }

    pub fn messages(&self) -> Vec<&str> {
        [&self.email, &self.password, &self.username]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect()
    }
}

impl LoginForm {
    pub fn validate(&self, registering: bool) -> Result<(), LoginFormErrors> {
        let mut errors = LoginFormErrors::default();

        let email = self.email.trim();
        if email.is_empty() {
            errors.email = Some("Email is required".to_string());
        } else if !email_pattern().is_match(email) {
            errors.email = Some("Please enter a valid email".to_string());
        }

        if self.password.is_empty() {
            errors.password = Some("Password is required".to_string());
        }

        if registering
            && self
                .username
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
        {
            errors.username = Some("Username is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
