// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const EXPENSE_CATEGORIES: [&str; 4] = ["식비", "교통", "쇼핑", "기타"];
pub const INCOME_CATEGORIES: [&str; 3] = ["급여", "용돈", "기타"];

/// Largest amount a single record may carry (one trillion won).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Categories the entry form offers for this type.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            TransactionType::Income => "+",
            TransactionType::Expense => "-",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Unknown transaction type '{}'", other)),
        }
    }
}

/// A persisted ledger record. Records are never edited; a change is a
/// delete followed by a create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: String, // YYYY-MM-DD
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

/// What a client submits to the store. `id` and `created_at` are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub user_id: String,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFilter {
    Income,
    Expense,
    #[default]
    All,
}

impl StatFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        match self {
            StatFilter::Income => t.r#type == TransactionType::Income,
            StatFilter::Expense => t.r#type == TransactionType::Expense,
            StatFilter::All => true,
        }
    }
}

impl FromStr for StatFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(StatFilter::Income),
            "expense" => Ok(StatFilter::Expense),
            "all" => Ok(StatFilter::All),
            other => Err(format!("Unknown filter '{}' (use income|expense|all)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub income: Decimal,
    pub expense: Decimal,
}

impl DailySummary {
    pub fn is_empty(&self) -> bool {
        self.income.is_zero() && self.expense.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provider {
    Anonymous,
    Google { email: String, display_name: String },
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anonymous => "anonymous",
            Provider::Google { .. } => "google",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub provider: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}
