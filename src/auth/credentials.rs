//! Credential handling for node basic authentication
//!
//! Credentials are entered interactively at connect time, held in memory
//! for the lifetime of the connection and sent with every request. They are
//! never written to disk and their `Debug` form hides the password.

use std::fmt;
use std::io;

use crate::errors::{InputResult, UserInputError};

/// Username/password pair for HTTP basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate and build a credential pair
    ///
    /// Both parts must be non-empty and the username must be usable in a
    /// basic-auth header.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> InputResult<Self> {
        let username = username.into().trim().to_string();
        let password = password.into();

        if username.is_empty() {
            return Err(UserInputError::InvalidCredentials {
                reason: "username cannot be empty".to_string(),
            });
        }
        if !is_valid_username(&username) {
            return Err(UserInputError::InvalidCredentials {
                reason: "username cannot contain ':' or whitespace".to_string(),
            });
        }
        if password.is_empty() {
            return Err(UserInputError::InvalidCredentials {
                reason: "password cannot be empty".to_string(),
            });
        }

        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Basic-auth usernames cannot contain the ':' separator
fn is_valid_username(username: &str) -> bool {
    !username.chars().any(|c| c == ':' || c.is_whitespace())
}

/// Source of passwords typed by the user
pub trait SecretPrompt {
    /// Ask for a secret without echoing it
    fn prompt_secret(&mut self, label: &str) -> io::Result<String>;
}

/// Reads passwords from the controlling terminal with echo disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSecretPrompt;

impl SecretPrompt for TerminalSecretPrompt {
    fn prompt_secret(&mut self, label: &str) -> io::Result<String> {
        rpassword::prompt_password(label)
    }
}
