// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::{error, warn};

use super::{current_identity, Session, TransactionRow, ROW_HEADERS, SIGN_IN_HINT};
use crate::errors::BookError;
use crate::forms::TransactionForm;
use crate::ledger::Ledger;
use crate::models::TransactionType;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{fmt_won, is_date_key, maybe_print_json, pretty_table};

pub const CREATE_FAILED: &str = "등록 실패 (could not record the transaction)";
pub const DELETE_FAILED: &str = "삭제 실패 (could not delete the transaction)";

pub fn handle(store: &mut SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    let Some(identity) = current_identity(store.connection())? else {
        println!("{}", SIGN_IN_HINT);
        return Ok(());
    };
    let mut session = Session::open(store, identity)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            add(store, &mut session, sub)?;
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            if sub.get_flag("yes") || confirm(&format!("삭제하시겠습니까? ({})", id))? {
                remove(store, &mut session, &id);
            }
        }
        Some(("day", sub)) => day(&session.ledger, sub)?,
        Some(("list", sub)) => list(&session.ledger, sub)?,
        _ => {}
    }
    session.close(store);
    Ok(())
}

fn form_from_args(sub: &clap::ArgMatches) -> TransactionForm {
    let r#type = sub
        .get_one::<String>("type")
        .and_then(|s| s.parse::<TransactionType>().ok())
        .unwrap_or(TransactionType::Expense);
    let mut form = match sub.get_one::<String>("date") {
        Some(d) => TransactionForm::new(r#type, Some(d.trim().to_string())),
        None => TransactionForm::for_today(r#type),
    };
    form.amount = sub.get_one::<String>("amount").cloned().unwrap_or_default();
    if let Some(cat) = sub.get_one::<String>("category") {
        form.category = cat.trim().to_string();
    }
    if let Some(memo) = sub.get_one::<String>("memo") {
        form.description = memo.to_string();
    }
    form
}

/// Validates and submits the form. The new record is shown only once the
/// subscription delivers the snapshot containing it.
pub fn add<S: TransactionStore>(
    store: &mut S,
    session: &mut Session,
    sub: &clap::ArgMatches,
) -> Result<Option<String>> {
    let form = form_from_args(sub);
    let input = match form.validate(&session.identity.uid) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(None);
        }
    };
    let date = input.date.clone();
    match store.create(input) {
        Ok(id) => {
            println!("등록되었습니다! ({})", id);
            if session.refresh() {
                print_day(&session.ledger, &date)?;
            }
            Ok(Some(id))
        }
        Err(e) if e.is_validation() => {
            eprintln!("{}", e);
            Ok(None)
        }
        Err(e) => {
            error!(error = %e, "create failed");
            eprintln!("{}", CREATE_FAILED);
            Ok(None)
        }
    }
}

/// Deletes a record of the signed-in user. Unknown ids are logged only;
/// store failures print a generic failure message.
pub fn remove<S: TransactionStore>(store: &mut S, session: &mut Session, id: &str) -> bool {
    if !session.ledger.contains(id) {
        warn!(id, "not in the current ledger; nothing deleted");
        return false;
    }
    match store.delete(id) {
        Ok(()) => {
            session.refresh();
            println!("Deleted {}", id);
            true
        }
        Err(BookError::NotFound(_)) => {
            warn!(id, "already gone");
            false
        }
        Err(e) => {
            error!(id, error = %e, "delete failed");
            eprintln!("{}", DELETE_FAILED);
            false
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub transactions: Vec<TransactionRow>,
}

pub fn day_view(ledger: &Ledger, date: &str) -> DayView {
    let totals = ledger.summary_for_key(date);
    DayView {
        date: date.to_string(),
        income: totals.income,
        expense: totals.expense,
        transactions: ledger
            .day_transactions(date)
            .into_iter()
            .map(TransactionRow::from)
            .collect(),
    }
}

fn print_day(ledger: &Ledger, date: &str) -> Result<()> {
    let view = day_view(ledger, date);
    println!("{} 거래 내역", view.date);
    if !(view.income.is_zero() && view.expense.is_zero()) {
        println!(
            "수입 +{}  지출 -{}",
            fmt_won(&view.income),
            fmt_won(&view.expense)
        );
    }
    if view.transactions.is_empty() {
        println!("거래 내역이 없습니다");
    } else {
        let rows = view.transactions.iter().map(|r| r.cells()).collect();
        println!("{}", pretty_table(&ROW_HEADERS, rows));
    }
    Ok(())
}

fn day(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let date = sub.get_one::<String>("date").unwrap().trim();
    if !is_date_key(date) {
        eprintln!("Invalid date '{}', expected YYYY-MM-DD", date);
        return Ok(());
    }
    let view = day_view(ledger, date);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        print_day(ledger, date)?;
    }
    Ok(())
}

pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Vec<TransactionRow> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    ledger
        .recent()
        .into_iter()
        .take(limit)
        .map(TransactionRow::from)
        .collect()
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, sub);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("거래 내역이 없습니다.");
        } else {
            let rows = data.iter().map(|r| r.cells()).collect();
            println!("{}", pretty_table(&ROW_HEADERS, rows));
        }
    }
    Ok(())
}
