// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use moneybook::{cli, commands, config::Config, db, store::SqliteStore};

fn main() -> Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init(&config)?;
    debug!(path = %config.db_path.display(), "database ready");
    let mut store = SqliteStore::new(conn)?;

    match matches.subcommand() {
        Some(("login", sub)) => {
            commands::auth::login(store.connection(), sub)?;
        }
        Some(("logout", _)) => commands::auth::logout(store.connection())?,
        Some(("whoami", _)) => commands::auth::whoami(store.connection())?,
        Some(("calendar", sub)) => commands::calendar::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&mut store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
