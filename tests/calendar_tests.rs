// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneybook::auth::{Auth, LocalAuth};
use moneybook::calendar::YearMonth;
use moneybook::commands::calendar::{self, focus_month, month_view, resolve_month};
use moneybook::ledger::Ledger;
use moneybook::models::{NewTransaction, Provider, TransactionType};
use moneybook::store::{SqliteStore, TransactionStore};
use moneybook::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn calendar_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["moneybook", "calendar"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("calendar", sub)) => sub.clone(),
        _ => panic!("no calendar subcommand"),
    }
}

#[test]
fn navigation_moves_and_persists_focus() {
    let conn = conn();
    db::set_setting(&conn, "focus_month", "2024-01").unwrap();

    let ym = resolve_month(&conn, &calendar_matches(&["--prev"])).unwrap();
    assert_eq!(ym, YearMonth::new(2023, 12).unwrap());
    assert_eq!(focus_month(&conn).unwrap(), ym);

    let ym = resolve_month(&conn, &calendar_matches(&["--next"])).unwrap();
    assert_eq!(ym.to_string(), "2024-01");

    // --month peeks without moving the focus.
    let ym = resolve_month(&conn, &calendar_matches(&["--month", "2020-07"])).unwrap();
    assert_eq!(ym.to_string(), "2020-07");
    assert_eq!(focus_month(&conn).unwrap().to_string(), "2024-01");
}

#[test]
fn goto_is_limited_to_picker_years() {
    let conn = conn();
    let this_year = YearMonth::today().year;
    let ok = format!("{}-03", this_year - 5);
    let ym = resolve_month(&conn, &calendar_matches(&["--goto", &ok])).unwrap();
    assert_eq!(focus_month(&conn).unwrap(), ym);

    let too_far = format!("{}-03", this_year + 6);
    assert!(resolve_month(&conn, &calendar_matches(&["--goto", &too_far])).is_err());
    assert_eq!(focus_month(&conn).unwrap(), ym);
}

#[test]
fn signed_out_navigation_keeps_focus() {
    let mut store = SqliteStore::new(Connection::open_in_memory().unwrap()).unwrap();
    db::set_setting(store.connection(), "focus_month", "2024-01").unwrap();

    calendar::handle(&mut store, &calendar_matches(&["--next"])).unwrap();
    assert_eq!(focus_month(store.connection()).unwrap().to_string(), "2024-01");

    LocalAuth::new(store.connection())
        .sign_in(Provider::Anonymous)
        .unwrap();
    calendar::handle(&mut store, &calendar_matches(&["--next"])).unwrap();
    assert_eq!(focus_month(store.connection()).unwrap().to_string(), "2024-02");
}

#[test]
fn focus_defaults_to_today() {
    let conn = conn();
    assert_eq!(focus_month(&conn).unwrap(), YearMonth::today());
}

#[test]
fn month_view_pairs_cells_with_daily_totals() {
    let mut store = SqliteStore::new(Connection::open_in_memory().unwrap()).unwrap();
    for (t, amount, date) in [
        (TransactionType::Income, 50000, "2024-05-01"),
        (TransactionType::Expense, 12000, "2024-05-01"),
        (TransactionType::Expense, 8000, "2024-05-15"),
    ] {
        store
            .create(NewTransaction {
                user_id: "u1".into(),
                r#type: t,
                amount: Decimal::from(amount),
                category: "기타".into(),
                description: String::new(),
                date: date.into(),
            })
            .unwrap();
    }
    let sub = store.subscribe("u1").unwrap();
    let mut ledger = Ledger::default();
    assert!(ledger.sync(&sub));

    let ym = YearMonth::new(2024, 5).unwrap();
    let view = month_view(&ledger, ym);
    assert_eq!(view.weeks.len(), 5);
    assert!(view.weeks.iter().all(|w| w.len() == 7));
    let first = &view.weeks[0][3];
    assert_eq!(first.day, Some(1));
    assert_eq!(first.income, "50000");
    assert_eq!(first.expense, "12000");
    assert_eq!(view.stats.balance, Decimal::from(30000));

    let empty = month_view(&Ledger::default(), ym);
    assert_eq!(empty.weeks.len(), 5);
    assert_eq!(empty.stats.income, Decimal::ZERO);
}
