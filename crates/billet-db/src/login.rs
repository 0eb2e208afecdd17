use chrono::{DateTime, Duration, Utc};
use redb::ReadableTable;

use crate::error::StoreError;
use crate::models::Login;
use crate::tables::LOGINS;
use crate::{Store, decode, encode, ids};

/// How long an issued login token stays verifiable.
pub const LOGIN_TTL_SECS: i64 = 3600;

impl Store {
    /// Issue a fresh single-use login token for `email`.
    pub fn issue_login(&self, email: &str) -> Result<String, StoreError> {
        self.issue_login_at(email, Utc::now())
    }

    pub fn issue_login_at(
        &self,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let token = ids::login_token();
        let login = Login {
            email: email.to_string(),
            issued_at,
        };
        self.write(|txn| {
            let mut logins = txn.open_table(LOGINS)?;
            logins.insert(token.as_str(), encode(&login)?.as_slice())?;
            Ok(())
        })?;
        Ok(token)
    }

    /// Verify and consume a login token, returning the authenticated email.
    ///
    /// The token record is deleted on every attempt: a second call with the
    /// same token fails with `LoginNotFound` even inside the validity
    /// window, and an expired token is not resurrected.
    pub fn verify_login(&self, token: &str) -> Result<String, StoreError> {
        self.verify_login_at(token, Utc::now())
    }

    pub fn verify_login_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        // Read-and-delete in one committed transaction; the expiry check
        // happens after the commit so a stale token is consumed too.
        let login = self.write(|txn| {
            let mut logins = txn.open_table(LOGINS)?;
            match logins.remove(token)? {
                Some(raw) => Ok(Some(decode::<Login>(raw.value())?)),
                None => Ok(None),
            }
        })?;

        let login = login.ok_or(StoreError::LoginNotFound)?;
        if now.signed_duration_since(login.issued_at) > Duration::seconds(LOGIN_TTL_SECS) {
            return Err(StoreError::LoginExpired);
        }
        Ok(login.email)
    }

    /// Delete unconsumed tokens issued before `cutoff`. Returns how many
    /// were removed. Verification-time expiry stays authoritative; this only
    /// keeps never-verified tokens from accumulating.
    pub fn sweep_logins(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        self.write(|txn| {
            let mut logins = txn.open_table(LOGINS)?;

            let mut stale = Vec::new();
            for entry in logins.iter()? {
                let (key, value) = entry?;
                let login: Login = decode(value.value())?;
                if login.issued_at < cutoff {
                    stale.push(key.value().to_string());
                }
            }

            for token in &stale {
                logins.remove(token.as_str())?;
            }
            Ok(stale.len())
        })
    }
}
