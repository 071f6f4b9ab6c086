//! Identity client contracts and the local account implementation.
//!
//! # Responsibility
//! - Define email/password sign-in and account creation contracts.
//! - Carry provider-style, human-readable failure messages.
//!
//! # Invariants
//! - Credentials are never logged.
//! - Stored passwords are salted digests, never plaintext.

use crate::db::DbError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod password;
pub mod sqlite_identity;

pub use sqlite_identity::SqliteIdentityClient;

pub type AuthResult<T> = Result<T, AuthError>;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Authenticated principal returned by the identity client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub signed_in_at: i64,
}

/// Identity provider failure.
#[derive(Debug)]
pub enum AuthError {
    InvalidEmail,
    WeakPassword,
    EmailAlreadyInUse,
    /// Unknown account or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    Storage(DbError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "The email address is badly formatted."),
            Self::WeakPassword => write!(
                f,
                "Password should be at least {MIN_PASSWORD_CHARS} characters."
            ),
            Self::EmailAlreadyInUse => {
                write!(f, "The email address is already in use by another account.")
            }
            Self::InvalidCredentials => write!(f, "The email or password is incorrect."),
            Self::Storage(err) => write!(f, "Identity storage failure: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for AuthError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Email/password identity provider.
pub trait IdentityClient {
    fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session>;
    fn create_account(&self, email: &str, password: &str) -> AuthResult<Session>;
}
