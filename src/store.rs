// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record store with live snapshot subscriptions.
//!
//! Subscribers receive the complete record set of their owner: once when
//! they subscribe and again after every change to that owner's records.
//! There are no deltas; each snapshot replaces the previous one.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db;
use crate::errors::{BookError, Result};
use crate::forms::amount_too_large;
use crate::models::{NewTransaction, Transaction, TransactionType, MAX_AMOUNT};
use crate::utils::is_date_key;

pub type Snapshot = Arc<[Transaction]>;

pub trait TransactionStore {
    /// Starts a live feed of `owner`'s records. The current snapshot is
    /// already queued when this returns.
    fn subscribe(&mut self, owner: &str) -> Result<Subscription>;

    fn unsubscribe(&mut self, sub: Subscription);

    /// Persists a record and returns the id the store assigned to it.
    fn create(&mut self, record: NewTransaction) -> Result<String>;

    fn delete(&mut self, id: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct Subscription {
    id: u64,
    owner: String,
    rx: Receiver<Snapshot>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn try_next(&self) -> Option<Snapshot> {
        match self.rx.try_recv() {
            Ok(s) => Some(s),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything pending and returns only the newest snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut last = None;
        while let Some(s) = self.try_next() {
            last = Some(s);
        }
        last
    }
}

struct Subscriber {
    id: u64,
    owner: String,
    tx: Sender<Snapshot>,
}

pub struct SqliteStore {
    conn: Connection,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Result<Self> {
        db::init_schema(&conn)?;
        Ok(Self {
            conn,
            subscribers: Vec::new(),
            next_id: 1,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Current records of `owner`, oldest first.
    pub fn snapshot(&self, owner: &str) -> Result<Snapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, amount, category, description, date, created_at, user_id
             FROM transactions WHERE user_id=?1 ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![owner], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, Option<String>>(4)?,
                r.get::<_, String>(5)?,
                r.get::<_, DateTime<Utc>>(6)?,
                r.get::<_, String>(7)?,
            ))
        })?;
        let mut data = Vec::new();
        for row in rows {
            let (id, typ, amount, category, description, date, created_at, user_id) = row?;
            let r#type = typ.parse::<TransactionType>().map_err(BookError::Remote)?;
            let amount = amount
                .parse::<Decimal>()
                .map_err(|e| BookError::Remote(format!("Invalid amount '{}' on {}: {}", amount, id, e)))?;
            data.push(Transaction {
                id,
                r#type,
                amount,
                category,
                description: description.unwrap_or_default(),
                date,
                created_at,
                user_id,
            });
        }
        Ok(Arc::from(data))
    }

    fn publish(&mut self, owner: &str) -> Result<()> {
        if !self.subscribers.iter().any(|s| s.owner == owner) {
            return Ok(());
        }
        let snapshot = self.snapshot(owner)?;
        debug!(owner, records = snapshot.len(), "pushing snapshot");
        self.subscribers.retain(|s| {
            if s.owner != owner {
                return true;
            }
            let alive = s.tx.send(Arc::clone(&snapshot)).is_ok();
            if !alive {
                debug!(subscription = s.id, "dropping closed subscription");
            }
            alive
        });
        Ok(())
    }

    fn new_id(&self) -> Result<String> {
        let id: String = self
            .conn
            .query_row("SELECT lower(hex(randomblob(10)))", [], |r| r.get(0))?;
        Ok(id)
    }
}

impl TransactionStore for SqliteStore {
    fn subscribe(&mut self, owner: &str) -> Result<Subscription> {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        let snapshot = self.snapshot(owner)?;
        // rx is still held here, so the first send cannot fail
        let _ = tx.send(snapshot);
        self.subscribers.push(Subscriber {
            id,
            owner: owner.to_string(),
            tx,
        });
        debug!(subscription = id, owner, "subscribed");
        Ok(Subscription {
            id,
            owner: owner.to_string(),
            rx,
        })
    }

    fn unsubscribe(&mut self, sub: Subscription) {
        self.subscribers.retain(|s| s.id != sub.id);
        debug!(subscription = sub.id, "unsubscribed");
    }

    fn create(&mut self, record: NewTransaction) -> Result<String> {
        if record.amount.is_sign_negative() {
            return Err(BookError::Validation(format!(
                "Amount must not be negative (got {})",
                record.amount
            )));
        }
        if record.amount > MAX_AMOUNT {
            return Err(amount_too_large(record.amount));
        }
        if !is_date_key(&record.date) {
            return Err(BookError::Validation(format!(
                "Invalid date '{}', expected YYYY-MM-DD",
                record.date
            )));
        }
        let id = self.new_id()?;
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO transactions(id, user_id, type, amount, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                record.user_id,
                record.r#type.as_str(),
                record.amount.to_string(),
                record.category,
                record.description,
                record.date,
                created_at,
            ],
        )?;
        info!(id = %id, owner = %record.user_id, date = %record.date, "transaction created");
        self.publish(&record.user_id)?;
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM transactions WHERE id=?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(owner) = owner else {
            warn!(id, "delete of unknown transaction");
            return Err(BookError::NotFound(id.to_string()));
        };
        self.conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        info!(id, owner = %owner, "transaction deleted");
        self.publish(&owner)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn input(user: &str, amount: i64, date: &str) -> NewTransaction {
        NewTransaction {
            user_id: user.to_string(),
            r#type: TransactionType::Expense,
            amount: Decimal::from(amount),
            category: "식비".to_string(),
            description: String::new(),
            date: date.to_string(),
        }
    }

    #[test]
    fn subscribe_delivers_current_snapshot() {
        let mut s = store();
        s.create(input("u1", 100, "2024-05-01")).unwrap();
        let sub = s.subscribe("u1").unwrap();
        let snap = sub.try_next().unwrap();
        assert_eq!(snap.len(), 1);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn create_pushes_to_owner_only() {
        let mut s = store();
        let mine = s.subscribe("u1").unwrap();
        let theirs = s.subscribe("u2").unwrap();
        mine.latest();
        theirs.latest();

        let id = s.create(input("u1", 100, "2024-05-01")).unwrap();
        let snap = mine.latest().unwrap();
        assert_eq!(snap[0].id, id);
        assert!(theirs.try_next().is_none());
    }

    #[test]
    fn delete_pushes_and_unknown_id_is_not_found() {
        let mut s = store();
        let id = s.create(input("u1", 100, "2024-05-01")).unwrap();
        let sub = s.subscribe("u1").unwrap();
        sub.latest();

        s.delete(&id).unwrap();
        assert!(sub.latest().unwrap().is_empty());
        assert!(matches!(s.delete(&id), Err(BookError::NotFound(_))));
    }

    #[test]
    fn unsubscribe_and_dropped_receivers_stop_delivery() {
        let mut s = store();
        let a = s.subscribe("u1").unwrap();
        let b = s.subscribe("u1").unwrap();
        assert_eq!(s.subscriber_count(), 2);
        s.unsubscribe(a);
        assert_eq!(s.subscriber_count(), 1);
        drop(b);
        s.create(input("u1", 1, "2024-05-01")).unwrap();
        assert_eq!(s.subscriber_count(), 0);
    }

    #[test]
    fn create_rejects_negative_amount_and_bad_date() {
        let mut s = store();
        assert!(s.create(input("u1", -1, "2024-05-01")).unwrap_err().is_validation());
        assert!(s.create(input("u1", 1, "2024-5-1")).unwrap_err().is_validation());
        assert!(s.snapshot("u1").unwrap().is_empty());
    }

    #[test]
    fn create_rejects_amount_above_cap() {
        let mut s = store();
        let mut big = input("u1", 0, "2024-05-01");
        big.amount = Decimal::MAX;
        assert!(s.create(big).unwrap_err().is_validation());
        let mut cap = input("u1", 0, "2024-05-01");
        cap.amount = MAX_AMOUNT;
        s.create(cap).unwrap();
        assert_eq!(s.snapshot("u1").unwrap().len(), 1);
    }

    #[test]
    fn snapshot_is_oldest_first() {
        let mut s = store();
        let first = s.create(input("u1", 1, "2024-05-09")).unwrap();
        let second = s.create(input("u1", 2, "2024-05-01")).unwrap();
        let snap = s.snapshot("u1").unwrap();
        assert_eq!(snap[0].id, first);
        assert_eq!(snap[1].id, second);
        assert!(snap[0].created_at <= snap[1].created_at);
    }
}
