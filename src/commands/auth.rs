// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use tracing::error;

use crate::auth::{Auth, LocalAuth};
use crate::errors::BookError;
use crate::models::{Identity, Provider};
use crate::utils::pretty_table;

pub fn login(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<Identity>> {
    let provider = match sub.get_one::<String>("google") {
        Some(email) => Provider::Google {
            email: email.to_string(),
            display_name: sub
                .get_one::<String>("name")
                .map(|s| s.to_string())
                .unwrap_or_default(),
        },
        None => Provider::Anonymous,
    };
    let mut auth = LocalAuth::new(conn);
    match auth.sign_in(provider) {
        Ok(ident) => {
            println!(
                "Signed in as {} ({})",
                ident.display_name.as_deref().unwrap_or("anonymous"),
                ident.uid
            );
            Ok(Some(ident))
        }
        Err(BookError::Auth(msg)) => {
            eprintln!("로그인에 실패했습니다: {}", msg);
            Ok(None)
        }
        Err(e) => {
            error!(error = %e, "sign-in failed");
            eprintln!("로그인에 실패했습니다. 다시 시도해주세요.");
            Ok(None)
        }
    }
}

pub fn logout(conn: &Connection) -> Result<()> {
    LocalAuth::new(conn).sign_out()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(conn: &Connection) -> Result<()> {
    match LocalAuth::new(conn).current_user()? {
        Some(ident) => {
            let rows = vec![vec![
                ident.uid,
                ident.provider,
                ident.display_name.unwrap_or_default(),
                ident.email.unwrap_or_default(),
            ]];
            println!(
                "{}",
                pretty_table(&["UID", "Provider", "Name", "Email"], rows)
            );
        }
        None => println!("{}", super::SIGN_IN_HINT),
    }
    Ok(())
}
