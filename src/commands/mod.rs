// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod calendar;
pub mod reports;
pub mod transactions;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::auth::{Auth, LocalAuth};
use crate::ledger::Ledger;
use crate::models::{Identity, Transaction};
use crate::store::{Subscription, TransactionStore};
use crate::utils::fmt_won;

pub const SIGN_IN_HINT: &str = "Not signed in. Run `moneybook login` first.";

/// A signed-in user's live view of their ledger.
pub struct Session {
    pub identity: Identity,
    pub ledger: Ledger,
    sub: Subscription,
}

impl Session {
    pub fn open<S: TransactionStore>(store: &mut S, identity: Identity) -> Result<Self> {
        let sub = store
            .subscribe(&identity.uid)
            .with_context(|| format!("Subscribe to ledger of {}", identity.uid))?;
        let mut ledger = Ledger::default();
        ledger.sync(&sub);
        debug!(uid = %identity.uid, records = ledger.len(), "session opened");
        Ok(Self {
            identity,
            ledger,
            sub,
        })
    }

    /// Picks up snapshots pushed since the last refresh.
    pub fn refresh(&mut self) -> bool {
        self.ledger.sync(&self.sub)
    }

    pub fn close<S: TransactionStore>(self, store: &mut S) {
        store.unsubscribe(self.sub);
    }
}

pub fn current_identity(conn: &Connection) -> Result<Option<Identity>> {
    LocalAuth::new(conn)
        .current_user()
        .context("Read signed-in user")
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id.clone(),
            date: t.date.clone(),
            r#type: t.r#type.to_string(),
            category: t.category.clone(),
            description: t.description.clone(),
            amount: format!("{}{}", t.r#type.sign(), fmt_won(&t.amount)),
        }
    }
}

impl TransactionRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.date.clone(),
            self.category.clone(),
            self.description.clone(),
            self.amount.clone(),
        ]
    }
}

pub const ROW_HEADERS: [&str; 5] = ["ID", "Date", "Category", "Memo", "Amount"];
