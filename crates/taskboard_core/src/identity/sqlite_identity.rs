//! Local account store implementing `IdentityClient`.
//!
//! # Invariants
//! - Emails are trimmed and lowercased before lookup and storage.
//! - Sign-in failures never reveal whether the account exists.

use crate::db::{self, now_epoch_ms, SharedConnection};
use crate::identity::password::{digest, digests_match, new_salt};
use crate::identity::{AuthError, AuthResult, IdentityClient, Session, MIN_PASSWORD_CHARS};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Identity client backed by the `accounts` table.
#[derive(Clone)]
pub struct SqliteIdentityClient {
    conn: SharedConnection,
}

impl SqliteIdentityClient {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl IdentityClient for SqliteIdentityClient {
    fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        let row: Option<(String, String, String)> = {
            let conn = db::lock(&self.conn)?;
            conn.query_row(
                "SELECT uid, password_salt, password_hash FROM accounts WHERE email = ?1;",
                [email.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
        };

        let Some((uid, salt, stored_hash)) = row else {
            warn!("event=auth_sign_in module=identity status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };
        if !digests_match(&digest(&salt, password), &stored_hash) {
            warn!("event=auth_sign_in module=identity status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        }

        info!("event=auth_sign_in module=identity status=ok");
        Ok(Session {
            uid,
            email,
            signed_in_at: now_epoch_ms(),
        })
    }

    fn create_account(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }

        let uid = Uuid::new_v4().simple().to_string();
        let salt = new_salt();
        let hash = digest(&salt, password);
        {
            let conn = db::lock(&self.conn)?;
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1);",
                [email.as_str()],
                |row| row.get(0),
            )?;
            if exists {
                warn!("event=auth_sign_up module=identity status=error error_code=email_in_use");
                return Err(AuthError::EmailAlreadyInUse);
            }
            conn.execute(
                "INSERT INTO accounts (uid, email, password_salt, password_hash)
                 VALUES (?1, ?2, ?3, ?4);",
                params![uid, email, salt, hash],
            )?;
        }

        info!("event=auth_sign_up module=identity status=ok");
        Ok(Session {
            uid,
            email,
            signed_in_at: now_epoch_ms(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
