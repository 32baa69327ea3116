// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// Input rejected before anything was sent to the store.
    #[error("{0}")]
    Validation(String),

    #[error("Store request failed: {0}")]
    Remote(String),

    #[error("Transaction '{0}' not found")]
    NotFound(String),

    #[error("Sign-in failed: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl BookError {
    /// Validation errors block the action with their own message; everything
    /// else is reported to the user as a generic failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, BookError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, BookError>;
