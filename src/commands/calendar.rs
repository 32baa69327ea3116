// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{current_identity, Session, SIGN_IN_HINT};
use crate::calendar::{picker_years, Cell, YearMonth, WEEKDAY_LABELS};
use crate::db;
use crate::ledger::Ledger;
use crate::models::MonthlyStats;
use crate::store::SqliteStore;
use crate::utils::{fmt_won, maybe_print_json, pretty_table};

const FOCUS_KEY: &str = "focus_month";

/// Month the calendar is showing; today's month until the user navigates.
pub fn focus_month(conn: &Connection) -> Result<YearMonth> {
    match db::get_setting(conn, FOCUS_KEY)? {
        Some(s) => s.parse(),
        None => Ok(YearMonth::today()),
    }
}

pub fn set_focus_month(conn: &Connection, ym: YearMonth) -> Result<()> {
    db::set_setting(conn, FOCUS_KEY, &ym.to_string())?;
    debug!(month = %ym, "calendar focus moved");
    Ok(())
}

/// Applies `--prev`, `--next` or `--goto`, or reads `--month` without
/// moving the focus.
pub fn resolve_month(conn: &Connection, sub: &clap::ArgMatches) -> Result<YearMonth> {
    if let Some(m) = sub.get_one::<String>("month") {
        return m.parse();
    }
    let current = focus_month(conn)?;
    let target = if sub.get_flag("prev") {
        current.prev()
    } else if sub.get_flag("next") {
        current.next()
    } else if let Some(goto) = sub.get_one::<String>("goto") {
        let ym: YearMonth = goto.parse()?;
        let years = picker_years(YearMonth::today().year);
        if !years.contains(&ym.year) {
            return Err(anyhow!(
                "Year {} is outside {}..={}",
                ym.year,
                years.start(),
                years.end()
            ));
        }
        ym
    } else {
        return Ok(current);
    };
    set_focus_month(conn, target)?;
    Ok(target)
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub day: Option<u32>,
    pub income: String,
    pub expense: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub month: String,
    pub title: String,
    pub stats: MonthlyStats,
    pub weeks: Vec<Vec<DayCell>>,
}

pub fn month_view(ledger: &Ledger, ym: YearMonth) -> CalendarView {
    let weeks = ym
        .grid()
        .weeks()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Day(d) => {
                        let s = ledger.daily_summary(ym, *d);
                        DayCell {
                            day: Some(*d),
                            income: s.income.to_string(),
                            expense: s.expense.to_string(),
                        }
                    }
                    Cell::Empty => DayCell {
                        day: None,
                        income: "0".into(),
                        expense: "0".into(),
                    },
                })
                .collect()
        })
        .collect();
    CalendarView {
        month: ym.to_string(),
        title: ym.title(),
        stats: ledger.monthly_stats(ym),
        weeks,
    }
}

fn cell_text(ledger: &Ledger, ym: YearMonth, cell: Cell) -> String {
    let Some(day) = cell.day() else {
        return String::new();
    };
    let s = ledger.daily_summary(ym, day);
    let mut lines = vec![day.to_string()];
    if s.income > Decimal::ZERO {
        lines.push(format!("+{}", fmt_won(&s.income)));
    }
    if s.expense > Decimal::ZERO {
        lines.push(format!("-{}", fmt_won(&s.expense)));
    }
    lines.join("\n")
}

pub fn stats_table(stats: &MonthlyStats) -> comfy_table::Table {
    pretty_table(
        &["수입", "지출", "잔액"],
        vec![vec![
            format!("+{}", fmt_won(&stats.income)),
            format!("-{}", fmt_won(&stats.expense)),
            fmt_won(&stats.balance),
        ]],
    )
}

pub fn handle(store: &mut SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let Some(identity) = current_identity(store.connection())? else {
        println!("{}", SIGN_IN_HINT);
        return Ok(());
    };
    let ym = match resolve_month(store.connection(), sub) {
        Ok(ym) => ym,
        Err(e) => {
            eprintln!("{:#}", e);
            return Ok(());
        }
    };
    let session = Session::open(store, identity)?;

    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let view = month_view(&session.ledger, ym);
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        println!("{}", ym.title());
        println!("{}", stats_table(&view.stats));
        let rows: Vec<Vec<String>> = ym
            .grid()
            .weeks()
            .map(|row| {
                row.iter()
                    .map(|c| cell_text(&session.ledger, ym, *c))
                    .collect()
            })
            .collect();
        println!("{}", pretty_table(&WEEKDAY_LABELS, rows));
    }
    session.close(store);
    Ok(())
}
