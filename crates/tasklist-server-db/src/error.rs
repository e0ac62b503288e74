// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Unique constraint violated: {0}")]
	UniqueViolation(UniqueConstraint),

	#[error("Internal: {0}")]
	Internal(String),
}

/// The uniqueness rule a write ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueConstraint {
	/// `(provider, provider_subject)` is already bound to an account.
	ProviderIdentity,
	/// The email belongs to another account.
	Email,
	/// Any other unique index; holds the columns SQLite reported.
	Other(String),
}

impl UniqueConstraint {
	/// Classify a SQLite `UNIQUE constraint failed: <table>.<col>, ...` message.
	pub fn from_sqlite_message(message: &str) -> Self {
		let columns = message
			.strip_prefix("UNIQUE constraint failed:")
			.unwrap_or(message)
			.trim();
		let names: Vec<&str> = columns
			.split(',')
			.map(|c| c.trim().rsplit('.').next().unwrap_or(""))
			.collect();

		match names.as_slice() {
			["provider", "provider_subject"] | ["provider_subject", "provider"] => {
				UniqueConstraint::ProviderIdentity
			}
			["email"] => UniqueConstraint::Email,
			_ => UniqueConstraint::Other(columns.to_string()),
		}
	}
}

impl fmt::Display for UniqueConstraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UniqueConstraint::ProviderIdentity => write!(f, "provider identity"),
			UniqueConstraint::Email => write!(f, "email"),
			UniqueConstraint::Other(columns) => write!(f, "{columns}"),
		}
	}
}

/// Turn a unique-index failure into [`DbError::UniqueViolation`]; pass every
/// other error through.
pub fn map_unique_violation(err: sqlx::Error) -> DbError {
	match err {
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			DbError::UniqueViolation(UniqueConstraint::from_sqlite_message(db_err.message()))
		}
		_ => DbError::Sqlx(err),
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
