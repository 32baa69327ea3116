// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date key pattern"));

/// Canonical `YYYY-MM-DD` key for a calendar day.
///
/// Month and day are zero-padded to two digits. Every range query in the
/// ledger compares these keys as plain strings, which only matches
/// chronological order because the width is fixed.
pub fn date_key(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Inclusive `[YYYY-MM-01, YYYY-MM-31]` bounds for a month.
///
/// The upper bound is always `-31`. Keys of the same month share the
/// `YYYY-MM` prefix and sort inside the range; keys of any other month
/// differ in the prefix and sort outside it, so short months need no
/// special case.
pub fn month_bounds(year: i32, month: u32) -> (String, String) {
    (date_key(year, month, 1), date_key(year, month, 31))
}

pub fn is_date_key(s: &str) -> bool {
    DATE_KEY_RE.is_match(s)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace(',', "")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// `50000` -> `50,000원`. Fractional digits are kept as stored.
pub fn fmt_won(d: &Decimal) -> String {
    let s = d.normalize().to_string();
    let (neg, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, s),
    };
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (s, None),
    };
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut out = String::new();
    if neg {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac {
        out.push('.');
        out.push_str(&f);
    }
    out.push('원');
    out
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_pads_month_and_day() {
        assert_eq!(date_key(2024, 5, 1), "2024-05-01");
        assert_eq!(date_key(2024, 12, 31), "2024-12-31");
        assert!(is_date_key(&date_key(2024, 2, 9)));
    }

    #[test]
    fn date_key_pattern_rejects_unpadded() {
        assert!(!is_date_key("2024-5-1"));
        assert!(!is_date_key("2024-05-01T00:00"));
        assert!(!is_date_key(""));
    }

    #[test]
    fn month_bounds_use_fixed_31() {
        assert_eq!(
            month_bounds(2023, 2),
            ("2023-02-01".to_string(), "2023-02-31".to_string())
        );
    }

    #[test]
    fn won_formatting_groups_thousands() {
        assert_eq!(fmt_won(&Decimal::from(0)), "0원");
        assert_eq!(fmt_won(&Decimal::from(999)), "999원");
        assert_eq!(fmt_won(&Decimal::from(50000)), "50,000원");
        assert_eq!(fmt_won(&Decimal::from(-1234567)), "-1,234,567원");
        assert_eq!(fmt_won(&parse_decimal("1500.50").unwrap()), "1,500.5원");
    }

    #[test]
    fn parse_decimal_accepts_grouped_input() {
        assert_eq!(parse_decimal(" 12,000 ").unwrap(), Decimal::from(12000));
        assert!(parse_decimal("abc").is_err());
    }
}
