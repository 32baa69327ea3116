// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Local};
use rust_decimal::Decimal;

use crate::errors::{BookError, Result};
use crate::models::{NewTransaction, TransactionType, MAX_AMOUNT};
use crate::utils::{date_key, is_date_key, parse_date, parse_decimal};

pub const AMOUNT_REQUIRED: &str = "금액을 입력하세요 (enter an amount greater than 0)";
pub const AMOUNT_STEP: i64 = 1000;

/// Unvalidated entry-form state.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    pub r#type: TransactionType,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: Option<String>,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self::new(TransactionType::Expense, None)
    }
}

impl TransactionForm {
    pub fn new(r#type: TransactionType, date: Option<String>) -> Self {
        Self {
            r#type,
            amount: String::new(),
            category: default_category(r#type).to_string(),
            description: String::new(),
            date,
        }
    }

    /// Form opened from the floating add button: dated today.
    pub fn for_today(r#type: TransactionType) -> Self {
        Self::new(r#type, Some(today_key()))
    }

    /// Switching type resets the category to the new type's first option.
    pub fn set_type(&mut self, r#type: TransactionType) {
        if self.r#type != r#type {
            self.r#type = r#type;
            self.category = default_category(r#type).to_string();
        }
    }

    pub fn step_amount(&mut self, delta: i64) {
        self.amount = adjust_amount(&self.amount, delta);
    }

    pub fn validate(&self, user_id: &str) -> Result<NewTransaction> {
        let amount = match parse_decimal(&self.amount) {
            Ok(a) if a > MAX_AMOUNT => return Err(amount_too_large(a)),
            Ok(a) if a > Decimal::ZERO => a,
            _ => return Err(BookError::Validation(AMOUNT_REQUIRED.to_string())),
        };
        let date = match self.date.as_deref().map(str::trim) {
            Some(d) if is_date_key(d) && parse_date(d).is_ok() => d.to_string(),
            Some(d) if !d.is_empty() => {
                return Err(BookError::Validation(format!(
                    "Invalid date '{}', expected YYYY-MM-DD",
                    d
                )));
            }
            _ => return Err(BookError::Validation(AMOUNT_REQUIRED.to_string())),
        };
        let category = self.category.trim();
        if !self.r#type.categories().contains(&category) {
            return Err(BookError::Validation(format!(
                "Category '{}' is not available for {} (choose one of {})",
                category,
                self.r#type,
                self.r#type.categories().join(", ")
            )));
        }
        Ok(NewTransaction {
            user_id: user_id.to_string(),
            r#type: self.r#type,
            amount,
            category: category.to_string(),
            description: self.description.trim().to_string(),
            date,
        })
    }
}

pub fn amount_too_large(amount: Decimal) -> BookError {
    BookError::Validation(format!(
        "금액이 너무 큽니다 (amount {} exceeds {})",
        amount, MAX_AMOUNT
    ))
}

pub fn default_category(r#type: TransactionType) -> &'static str {
    r#type.categories()[0]
}

pub fn today_key() -> String {
    let now = Local::now().date_naive();
    date_key(now.year(), now.month(), now.day())
}

/// Amount stepper: unparsable input counts as 0 and the result stays
/// within `0..=MAX_AMOUNT`.
pub fn adjust_amount(current: &str, delta: i64) -> String {
    let cur = parse_decimal(current).unwrap_or(Decimal::ZERO);
    let next = cur
        .saturating_add(Decimal::from(delta))
        .clamp(Decimal::ZERO, MAX_AMOUNT);
    next.normalize().to_string()
}
