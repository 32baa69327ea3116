// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneybook::auth::{Auth, LocalAuth};
use moneybook::config::Config;
use moneybook::ledger::Ledger;
use moneybook::models::{NewTransaction, Provider, TransactionType};
use moneybook::store::{SqliteStore, TransactionStore};
use moneybook::{cli, commands, db};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn input(user: &str, date: &str) -> NewTransaction {
    NewTransaction {
        user_id: user.into(),
        r#type: TransactionType::Expense,
        amount: Decimal::from(1200),
        category: "교통".into(),
        description: "버스".into(),
        date: date.into(),
    }
}

#[test]
fn records_and_sign_in_survive_reopen() {
    let dir = tempdir().unwrap();
    let config = Config::with_db_path(dir.path().join("nested").join("book.sqlite"));

    let uid = {
        let mut store = SqliteStore::new(db::open_or_init(&config).unwrap()).unwrap();
        let uid = LocalAuth::new(store.connection())
            .sign_in(Provider::Anonymous)
            .unwrap()
            .uid;
        store.create(input(&uid, "2024-05-02")).unwrap();
        uid
    };

    let store = SqliteStore::new(db::open_or_init(&config).unwrap()).unwrap();
    let ident = commands::current_identity(store.connection()).unwrap().unwrap();
    assert_eq!(ident.uid, uid);
    let snap = store.snapshot(&uid).unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].description, "버스");
}

#[test]
fn ledger_follows_pushed_snapshots() {
    let dir = tempdir().unwrap();
    let conn = db::open_at(&dir.path().join("book.sqlite")).unwrap();
    let mut store = SqliteStore::new(conn).unwrap();
    let sub = store.subscribe("u1").unwrap();
    let mut ledger = Ledger::default();
    assert!(ledger.sync(&sub));
    assert!(ledger.is_empty());

    let a = store.create(input("u1", "2024-05-02")).unwrap();
    store.create(input("u1", "2024-05-03")).unwrap();
    store.create(input("u2", "2024-05-03")).unwrap();
    assert!(ledger.sync(&sub));
    assert_eq!(ledger.len(), 2);
    assert!(ledger.snapshot().iter().all(|t| t.user_id == "u1"));

    store.delete(&a).unwrap();
    assert!(ledger.sync(&sub));
    assert!(!ledger.contains(&a));
    assert!(!ledger.sync(&sub));

    store.unsubscribe(sub);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn login_command_signs_in_with_google() {
    let dir = tempdir().unwrap();
    let conn = db::open_at(&dir.path().join("book.sqlite")).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "moneybook",
        "login",
        "--google",
        "lee@example.com",
        "--name",
        "Lee",
    ]);
    let Some(("login", sub)) = matches.subcommand() else {
        panic!("no login subcommand");
    };
    let ident = commands::auth::login(&conn, sub).unwrap().unwrap();
    assert_eq!(ident.provider, "google");
    assert_eq!(ident.email.as_deref(), Some("lee@example.com"));

    let bad = cli::build_cli().get_matches_from(["moneybook", "login", "--google", "lee"]);
    let Some(("login", sub)) = bad.subcommand() else {
        panic!("no login subcommand");
    };
    assert!(commands::auth::login(&conn, sub).unwrap().is_none());
    assert_eq!(
        commands::current_identity(&conn).unwrap().map(|i| i.uid),
        Some(ident.uid)
    );
}
