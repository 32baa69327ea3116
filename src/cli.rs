// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, ArgGroup, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .value_name("YYYY-MM")
        .help("Month to show (defaults to the calendar's current month)")
}

pub fn build_cli() -> Command {
    Command::new("moneybook")
        .version(crate_version!())
        .about("Calendar-first income/expense ledger")
        .subcommand_required(false)
        .subcommand(
            Command::new("login")
                .about("Sign in (anonymous unless --google is given)")
                .arg(
                    Arg::new("google")
                        .long("google")
                        .value_name("EMAIL")
                        .help("Sign in with the Google account for EMAIL"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .value_name("DISPLAY_NAME")
                        .requires("google")
                        .help("Display name reported by the provider"),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out"))
        .subcommand(Command::new("whoami").about("Show the signed-in identity"))
        .subcommand(json_args(
            Command::new("calendar")
                .about("Show the month calendar with daily totals")
                .arg(month_arg())
                .arg(
                    Arg::new("prev")
                        .long("prev")
                        .action(ArgAction::SetTrue)
                        .help("Move to the previous month"),
                )
                .arg(
                    Arg::new("next")
                        .long("next")
                        .action(ArgAction::SetTrue)
                        .help("Move to the next month"),
                )
                .arg(
                    Arg::new("goto")
                        .long("goto")
                        .value_name("YYYY-MM")
                        .help("Jump to a month within five years of today"),
                )
                .group(
                    ArgGroup::new("nav")
                        .args(["month", "prev", "next", "goto"])
                        .multiple(false),
                ),
        ))
        .subcommand(
            Command::new("tx")
                .about("Add, remove and list transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .short('a')
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .short('t')
                                .value_parser(["income", "expense"])
                                .default_value("expense"),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .short('c')
                                .help("식비/교통/쇼핑/기타 for expenses, 급여/용돈/기타 for income"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .short('d')
                                .value_name("YYYY-MM-DD")
                                .help("Defaults to today"),
                        )
                        .arg(Arg::new("memo").long("memo")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").required(true))
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .short('y')
                                .action(ArgAction::SetTrue)
                                .help("Skip the confirmation prompt"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("day")
                        .about("Show one day's transactions")
                        .arg(Arg::new("date").required(true).value_name("YYYY-MM-DD")),
                ))
                .subcommand(json_args(
                    Command::new("list")
                        .about("List all transactions, newest first")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Monthly and all-time totals")
                .subcommand(json_args(
                    Command::new("month")
                        .about("Monthly totals and transactions")
                        .arg(month_arg())
                        .arg(
                            Arg::new("filter")
                                .long("filter")
                                .short('f')
                                .value_parser(["income", "expense", "all"])
                                .default_value("all"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("summary").about("All-time income, expense and balance"),
                )),
        )
}
