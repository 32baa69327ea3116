// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Sign-in state.
//!
//! `LocalAuth` keeps the known identities in the `users` table and the
//! signed-in uid under the `current_user` setting. Anonymous sign-in always
//! mints a new uid; a Google identity is keyed by its email.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info};

use crate::db;
use crate::errors::{BookError, Result};
use crate::models::{Identity, Provider};

const CURRENT_USER_KEY: &str = "current_user";

pub trait Auth {
    fn sign_in(&mut self, provider: Provider) -> Result<Identity>;

    fn sign_out(&mut self) -> Result<()>;

    fn current_user(&self) -> Result<Option<Identity>>;

    /// Identity-change feed. The current identity (or `None`) is sent
    /// right away, then once per sign-in or sign-out.
    fn watch(&mut self) -> Result<Receiver<Option<Identity>>>;
}

pub struct LocalAuth<'c> {
    conn: &'c Connection,
    watchers: Vec<Sender<Option<Identity>>>,
}

impl<'c> LocalAuth<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            watchers: Vec::new(),
        }
    }

    fn user(&self, uid: &str) -> Result<Option<Identity>> {
        let ident = self
            .conn
            .query_row(
                "SELECT uid, provider, email, display_name FROM users WHERE uid=?1",
                params![uid],
                |r| {
                    Ok(Identity {
                        uid: r.get(0)?,
                        provider: r.get(1)?,
                        email: r.get(2)?,
                        display_name: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(ident)
    }

    fn new_uid(&self) -> Result<String> {
        let uid: String = self
            .conn
            .query_row("SELECT lower(hex(randomblob(14)))", [], |r| r.get(0))?;
        Ok(uid)
    }

    fn notify(&mut self, ident: Option<Identity>) {
        self.watchers.retain(|w| w.send(ident.clone()).is_ok());
    }

    fn google_uid(&self, email: &str, display_name: &str) -> Result<String> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT uid FROM users WHERE email=?1",
                params![email],
                |r| r.get(0),
            )
            .optional()?;
        if let Some(uid) = existing {
            self.conn.execute(
                "UPDATE users SET display_name=?1 WHERE uid=?2",
                params![display_name, uid],
            )?;
            return Ok(uid);
        }
        let uid = self.new_uid()?;
        self.conn.execute(
            "INSERT INTO users(uid, provider, email, display_name) VALUES (?1, 'google', ?2, ?3)",
            params![uid, email, display_name],
        )?;
        Ok(uid)
    }
}

fn check_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(BookError::Auth(format!("'{}' is not an email address", email))),
    }
}

impl Auth for LocalAuth<'_> {
    fn sign_in(&mut self, provider: Provider) -> Result<Identity> {
        let uid = match &provider {
            Provider::Anonymous => {
                let uid = self.new_uid()?;
                self.conn.execute(
                    "INSERT INTO users(uid, provider) VALUES (?1, 'anonymous')",
                    params![uid],
                )?;
                uid
            }
            Provider::Google {
                email,
                display_name,
            } => {
                let email = email.trim().to_lowercase();
                check_email(&email)?;
                let name = match display_name.trim() {
                    "" => email.split('@').next().unwrap_or_default().to_string(),
                    n => n.to_string(),
                };
                self.google_uid(&email, &name)?
            }
        };
        db::set_setting(self.conn, CURRENT_USER_KEY, &uid)?;
        let ident = self
            .user(&uid)?
            .ok_or_else(|| BookError::Auth(format!("user {} vanished during sign-in", uid)))?;
        info!(uid = %ident.uid, provider = provider.as_str(), "signed in");
        self.notify(Some(ident.clone()));
        Ok(ident)
    }

    fn sign_out(&mut self) -> Result<()> {
        db::clear_setting(self.conn, CURRENT_USER_KEY)?;
        info!("signed out");
        self.notify(None);
        Ok(())
    }

    fn current_user(&self) -> Result<Option<Identity>> {
        match db::get_setting(self.conn, CURRENT_USER_KEY)? {
            Some(uid) => {
                let ident = self.user(&uid)?;
                if ident.is_none() {
                    debug!(uid = %uid, "current_user points at unknown user");
                }
                Ok(ident)
            }
            None => Ok(None),
        }
    }

    fn watch(&mut self) -> Result<Receiver<Option<Identity>>> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.current_user()?);
        self.watchers.push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn anonymous_sign_in_mints_new_users() {
        let conn = conn();
        let mut auth = LocalAuth::new(&conn);
        assert!(auth.current_user().unwrap().is_none());
        let a = auth.sign_in(Provider::Anonymous).unwrap();
        let b = auth.sign_in(Provider::Anonymous).unwrap();
        assert_ne!(a.uid, b.uid);
        assert_eq!(auth.current_user().unwrap(), Some(b));
    }

    #[test]
    fn google_sign_in_reuses_uid_per_email() {
        let conn = conn();
        let mut auth = LocalAuth::new(&conn);
        let first = auth
            .sign_in(Provider::Google {
                email: "Kim@Example.com".into(),
                display_name: String::new(),
            })
            .unwrap();
        assert_eq!(first.display_name.as_deref(), Some("kim"));
        auth.sign_out().unwrap();
        let again = auth
            .sign_in(Provider::Google {
                email: "kim@example.com".into(),
                display_name: "김".into(),
            })
            .unwrap();
        assert_eq!(first.uid, again.uid);
        assert_eq!(again.display_name.as_deref(), Some("김"));
    }

    #[test]
    fn bad_email_is_an_auth_failure() {
        let conn = conn();
        let mut auth = LocalAuth::new(&conn);
        let err = auth
            .sign_in(Provider::Google {
                email: "nobody".into(),
                display_name: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, BookError::Auth(_)));
        assert!(auth.current_user().unwrap().is_none());
    }

    #[test]
    fn watchers_see_identity_changes() {
        let conn = conn();
        let mut auth = LocalAuth::new(&conn);
        let rx = auth.watch().unwrap();
        assert_eq!(rx.try_recv().unwrap(), None);
        let ident = auth.sign_in(Provider::Anonymous).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Some(ident));
        auth.sign_out().unwrap();
        assert_eq!(rx.try_recv().unwrap(), None);
    }
}
