// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregation over a transaction snapshot.
//!
//! Every query is a pure function of the snapshot it is handed. Dates are
//! compared as `YYYY-MM-DD` strings: equality for a single day, an inclusive
//! lexicographic range `[YYYY-MM-01, YYYY-MM-31]` for a month.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::calendar::YearMonth;
use crate::models::{DailySummary, MonthlyStats, StatFilter, Transaction, TransactionType};
use crate::store::{Snapshot, Subscription};
use crate::utils::{date_key, month_bounds};

// Totals saturate at the Decimal bounds instead of overflowing.
fn sum_by_type<'a, I>(records: I) -> (Decimal, Decimal)
where
    I: IntoIterator<Item = &'a Transaction>,
{
    records
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| match t.r#type {
            TransactionType::Income => (inc.saturating_add(t.amount), exp),
            TransactionType::Expense => (inc, exp.saturating_add(t.amount)),
        })
}

fn stats(income: Decimal, expense: Decimal) -> MonthlyStats {
    MonthlyStats {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

fn in_month<'a>(
    transactions: &'a [Transaction],
    year: i32,
    month: u32,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    let (start, end) = month_bounds(year, month);
    transactions
        .iter()
        .filter(move |t| t.date.as_str() >= start.as_str() && t.date.as_str() <= end.as_str())
}

/// Records dated exactly `key`, in snapshot order.
pub fn day_transactions<'a>(transactions: &'a [Transaction], key: &str) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| t.date == key).collect()
}

pub fn daily_summary(transactions: &[Transaction], year: i32, month: u32, day: u32) -> DailySummary {
    summary_for_key(transactions, &date_key(year, month, day))
}

/// Totals for the records dated exactly `key`.
pub fn summary_for_key(transactions: &[Transaction], key: &str) -> DailySummary {
    let (income, expense) = sum_by_type(transactions.iter().filter(|t| t.date == key));
    DailySummary { income, expense }
}

pub fn monthly_stats(transactions: &[Transaction], year: i32, month: u32) -> MonthlyStats {
    let (income, expense) = sum_by_type(in_month(transactions, year, month));
    stats(income, expense)
}

/// Month records matching `filter`, latest day first. Records of the same
/// day keep their snapshot order.
pub fn monthly_transaction_list<'a>(
    transactions: &'a [Transaction],
    year: i32,
    month: u32,
    filter: StatFilter,
) -> Vec<&'a Transaction> {
    let mut out: Vec<&Transaction> = in_month(transactions, year, month)
        .filter(|t| filter.matches(t))
        .collect();
    // sort_by is stable
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

/// All-time totals over the whole snapshot.
pub fn overall_summary(transactions: &[Transaction]) -> MonthlyStats {
    let (income, expense) = sum_by_type(transactions);
    stats(income, expense)
}

/// Whole ledger, newest record first by creation time.
pub fn recent_transactions(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut out: Vec<&Transaction> = transactions.iter().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

/// Holds the latest snapshot delivered for one user.
///
/// A new snapshot replaces the old one wholesale; nothing is merged.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    snapshot: Snapshot,
}

impl Ledger {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn replace(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// Applies whatever the subscription has pushed since the last call,
    /// keeping only the newest snapshot. Returns whether anything arrived.
    pub fn sync(&mut self, sub: &Subscription) -> bool {
        match sub.latest() {
            Some(snapshot) => {
                self.replace(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> &[Transaction] {
        &self.snapshot
    }

    pub fn shared(&self) -> Snapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.iter().any(|t| t.id == id)
    }

    pub fn daily_summary(&self, ym: YearMonth, day: u32) -> DailySummary {
        daily_summary(&self.snapshot, ym.year, ym.month, day)
    }

    pub fn summary_for_key(&self, key: &str) -> DailySummary {
        summary_for_key(&self.snapshot, key)
    }

    pub fn day_transactions(&self, key: &str) -> Vec<&Transaction> {
        day_transactions(&self.snapshot, key)
    }

    pub fn monthly_stats(&self, ym: YearMonth) -> MonthlyStats {
        monthly_stats(&self.snapshot, ym.year, ym.month)
    }

    pub fn monthly_transactions(&self, ym: YearMonth, filter: StatFilter) -> Vec<&Transaction> {
        monthly_transaction_list(&self.snapshot, ym.year, ym.month, filter)
    }

    pub fn overall_summary(&self) -> MonthlyStats {
        overall_summary(&self.snapshot)
    }

    pub fn recent(&self) -> Vec<&Transaction> {
        recent_transactions(&self.snapshot)
    }
}
