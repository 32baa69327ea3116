// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month grid construction and month navigation.
//!
//! The grid is a pure function of `(year, month)`: leading blanks up to the
//! weekday of the 1st (Sunday first), the days of the month, then trailing
//! blanks to close the last week. It knows nothing about transactions;
//! callers pair each day cell with a ledger summary.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::utils::date_key;

pub const WEEKDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// How many years either side of the current one the month jump offers.
pub const PICKER_SPAN: i32 = 5;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Weekday of the 1st, 0 = Sunday ... 6 = Saturday.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Years offered by the month jump: `current - 5 ..= current + 5`.
pub fn picker_years(current_year: i32) -> std::ops::RangeInclusive<i32> {
    (current_year - PICKER_SPAN)..=(current_year + PICKER_SPAN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Invalid month number {}", month));
        }
        Ok(Self { year, month })
    }

    pub fn today() -> Self {
        let now = Local::now().date_naive();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn day_key(self, day: u32) -> String {
        date_key(self.year, self.month, day)
    }

    pub fn grid(self) -> CalendarGrid {
        CalendarGrid::new(self.year, self.month)
    }

    /// `YYYY년 M월`, the calendar header.
    pub fn title(self) -> String {
        format!("{}년 {}월", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        YearMonth::new(d.year(), d.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Day(u32),
}

impl Cell {
    pub fn day(&self) -> Option<u32> {
        match self {
            Cell::Day(d) => Some(*d),
            Cell::Empty => None,
        }
    }
}

/// The cells of one month view. Iterating never allocates and can be
/// repeated any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarGrid {
    first_weekday: u32,
    days: u32,
}

impl CalendarGrid {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            first_weekday: first_weekday(year, month),
            days: days_in_month(year, month),
        }
    }

    pub fn first_weekday(&self) -> u32 {
        self.first_weekday
    }

    pub fn days_in_month(&self) -> u32 {
        self.days
    }

    pub fn week_count(&self) -> u32 {
        (self.first_weekday + self.days).div_ceil(7)
    }

    pub fn len(&self) -> usize {
        (self.week_count() * 7) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Cells {
        Cells {
            grid: *self,
            index: 0,
        }
    }

    /// Rows of seven cells, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = [Cell; 7]> + use<> {
        let grid = *self;
        (0..grid.week_count()).map(move |w| {
            let mut row = [Cell::Empty; 7];
            for (i, slot) in row.iter_mut().enumerate() {
                *slot = grid.cell_at(w * 7 + i as u32);
            }
            row
        })
    }

    fn cell_at(&self, index: u32) -> Cell {
        if index < self.first_weekday || index >= self.first_weekday + self.days {
            Cell::Empty
        } else {
            Cell::Day(index - self.first_weekday + 1)
        }
    }
}

impl IntoIterator for CalendarGrid {
    type Item = Cell;
    type IntoIter = Cells;

    fn into_iter(self) -> Cells {
        self.iter()
    }
}

impl IntoIterator for &CalendarGrid {
    type Item = Cell;
    type IntoIter = Cells;

    fn into_iter(self) -> Cells {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Cells {
    grid: CalendarGrid,
    index: u32,
}

impl Iterator for Cells {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.index as usize >= self.grid.len() {
            return None;
        }
        let cell = self.grid.cell_at(self.index);
        self.index += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.grid.len().saturating_sub(self.index as usize);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Cells {}

/// Grid for `(year, month)`.
pub fn render_calendar_grid(year: i32, month: u32) -> CalendarGrid {
    CalendarGrid::new(year, month)
}
