// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use super::calendar::{focus_month, stats_table};
use super::{current_identity, Session, TransactionRow, ROW_HEADERS, SIGN_IN_HINT};
use crate::calendar::YearMonth;
use crate::ledger::Ledger;
use crate::models::{MonthlyStats, StatFilter};
use crate::store::SqliteStore;
use crate::utils::{fmt_won, maybe_print_json, pretty_table};

pub fn handle(store: &mut SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    let Some(identity) = current_identity(store.connection())? else {
        println!("{}", SIGN_IN_HINT);
        return Ok(());
    };
    let session = Session::open(store, identity)?;
    match m.subcommand() {
        Some(("month", sub)) => {
            let ym = match sub.get_one::<String>("month") {
                Some(s) => s.parse::<YearMonth>(),
                None => focus_month(store.connection()),
            };
            match ym {
                Ok(ym) => month(&session.ledger, ym, sub)?,
                Err(e) => eprintln!("{:#}", e),
            }
        }
        Some(("summary", sub)) => summary(&session.ledger, sub)?,
        _ => {}
    }
    session.close(store);
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub filter: StatFilter,
    pub stats: MonthlyStats,
    pub transactions: Vec<TransactionRow>,
}

pub fn month_report(ledger: &Ledger, ym: YearMonth, filter: StatFilter) -> MonthReport {
    MonthReport {
        month: ym.to_string(),
        filter,
        stats: ledger.monthly_stats(ym),
        transactions: ledger
            .monthly_transactions(ym, filter)
            .into_iter()
            .map(TransactionRow::from)
            .collect(),
    }
}

fn heading(ym: YearMonth, filter: StatFilter) -> String {
    let what = match filter {
        StatFilter::Income => "수입 내역",
        StatFilter::Expense => "지출 내역",
        StatFilter::All => "전체 내역",
    };
    format!("{} {}", ym.title(), what)
}

fn empty_message(filter: StatFilter) -> &'static str {
    match filter {
        StatFilter::Income => "수입 내역이 없습니다",
        StatFilter::Expense => "지출 내역이 없습니다",
        StatFilter::All => "거래 내역이 없습니다",
    }
}

fn month(ledger: &Ledger, ym: YearMonth, sub: &clap::ArgMatches) -> Result<()> {
    let filter = sub
        .get_one::<String>("filter")
        .map(|s| s.parse::<StatFilter>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let report = month_report(ledger, ym, filter);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!("{}", heading(ym, filter));
    match filter {
        StatFilter::All => println!("{}", stats_table(&report.stats)),
        StatFilter::Income => println!("총 수입 +{}", fmt_won(&report.stats.income)),
        StatFilter::Expense => println!("총 지출 -{}", fmt_won(&report.stats.expense)),
    }
    if report.transactions.is_empty() {
        println!("{}", empty_message(filter));
    } else {
        let rows = report.transactions.iter().map(|r| r.cells()).collect();
        println!("{}", pretty_table(&ROW_HEADERS, rows));
    }
    Ok(())
}

fn summary(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let totals = ledger.overall_summary();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        println!(
            "{}",
            pretty_table(
                &["총 수입", "총 지출", "잔액"],
                vec![vec![
                    format!("+{}", fmt_won(&totals.income)),
                    format!("-{}", fmt_won(&totals.expense)),
                    fmt_won(&totals.balance),
                ]],
            )
        );
    }
    Ok(())
}
