// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Account repository for database operations.
//!
//! Accounts are keyed by `(provider, provider_subject)` and optionally carry
//! a unique email. Both rules are enforced by unique indexes, and violations
//! come back as [`DbError::UniqueViolation`] so callers can tell a lost race
//! apart from a genuine store fault.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use tasklist_server_auth::{Account, AccountId, NewAccount, ProviderKey};
use uuid::Uuid;

use crate::error::{map_unique_violation, DbError};

#[async_trait]
pub trait AccountStore: Send + Sync {
	async fn get_account_by_provider_identity(
		&self,
		provider: &ProviderKey,
		provider_subject: &str,
	) -> Result<Option<Account>, DbError>;
	async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError>;
	async fn create_account(&self, account: &NewAccount) -> Result<Account, DbError>;
	async fn update_account(&self, account: &Account) -> Result<Account, DbError>;
}

#[async_trait]
impl AccountStore for AccountRepository {
	async fn get_account_by_provider_identity(
		&self,
		provider: &ProviderKey,
		provider_subject: &str,
	) -> Result<Option<Account>, DbError> {
		self
			.get_account_by_provider_identity(provider, provider_subject)
			.await
	}

	async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
		self.get_account_by_email(email).await
	}

	async fn create_account(&self, account: &NewAccount) -> Result<Account, DbError> {
		self.create_account(account).await
	}

	async fn update_account(&self, account: &Account) -> Result<Account, DbError> {
		self.update_account(account).await
	}
}

/// Repository for account database operations.
#[derive(Clone)]
pub struct AccountRepository {
	pool: SqlitePool,
}

impl AccountRepository {
	/// Create a new account repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the account bound to a provider identity.
	///
	/// # Returns
	/// `None` if the identity has never logged in.
	#[tracing::instrument(skip(self, provider_subject), fields(provider = %provider))]
	pub async fn get_account_by_provider_identity(
		&self,
		provider: &ProviderKey,
		provider_subject: &str,
	) -> Result<Option<Account>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, provider, provider_subject, display_name, email, created_at, updated_at
			FROM accounts
			WHERE provider = ? AND provider_subject = ?
			"#,
		)
		.bind(provider.as_str())
		.bind(provider_subject)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let account = parse_account_row(&row)?;
				tracing::debug!(account_id = %account.id, "account found by provider identity");
				Ok(Some(account))
			}
			None => Ok(None),
		}
	}

	/// Get the account that owns an email address. Matching ignores ASCII
	/// case.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, provider, provider_subject, display_name, email, created_at, updated_at
			FROM accounts
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let account = parse_account_row(&row)?;
				tracing::debug!(account_id = %account.id, "account found by email");
				Ok(Some(account))
			}
			None => Ok(None),
		}
	}

	/// Create an account.
	///
	/// # Database Constraints
	/// - `(provider, provider_subject)` must be unique
	/// - `email` must be unique when present
	///
	/// # Errors
	/// Returns [`DbError::UniqueViolation`] naming the violated constraint.
	#[tracing::instrument(skip(self, account), fields(provider = %account.provider))]
	pub async fn create_account(&self, account: &NewAccount) -> Result<Account, DbError> {
		let id = AccountId::generate();
		let now = Utc::now();

		sqlx::query(
			r#"
			INSERT INTO accounts (
				id, provider, provider_subject, display_name, email, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(account.provider.as_str())
		.bind(&account.provider_subject)
		.bind(&account.display_name)
		.bind(account.email.as_deref())
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(map_unique_violation)?;

		tracing::debug!(account_id = %id, provider = %account.provider, "account created");
		Ok(Account {
			id,
			provider: account.provider.clone(),
			provider_subject: account.provider_subject.clone(),
			display_name: account.display_name.clone(),
			email: account.email.clone(),
			created_at: now,
			updated_at: now,
		})
	}

	/// Write an account's mutable fields (`display_name`, `email`).
	///
	/// The provider identity is never written, so an account cannot be moved
	/// to another identity through this call.
	///
	/// # Errors
	/// - [`DbError::UniqueViolation`] if the email belongs to another account
	/// - [`DbError::NotFound`] if the account does not exist
	#[tracing::instrument(skip(self, account), fields(account_id = %account.id))]
	pub async fn update_account(&self, account: &Account) -> Result<Account, DbError> {
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			UPDATE accounts
			SET display_name = ?, email = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&account.display_name)
		.bind(account.email.as_deref())
		.bind(now.to_rfc3339())
		.bind(account.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(map_unique_violation)?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("account {}", account.id)));
		}

		tracing::debug!(account_id = %account.id, "account updated");
		Ok(Account {
			updated_at: now,
			..account.clone()
		})
	}
}

fn parse_account_row(row: &sqlx::sqlite::SqliteRow) -> Result<Account, DbError> {
	let id_str: String = row.get("id");
	let provider_str: String = row.get("provider");
	let provider_subject: String = row.get("provider_subject");
	let display_name: String = row.get("display_name");
	let email: Option<String> = row.get("email");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid account id UUID: {e}")))?;
	let provider = ProviderKey::parse(&provider_str)
		.map_err(|e| DbError::Internal(format!("Invalid provider: {e}")))?;

	let created_at = DateTime::parse_from_rfc3339(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);
	let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
		.with_timezone(&Utc);

	Ok(Account {
		id: AccountId::new(id),
		provider,
		provider_subject,
		display_name,
		email,
		created_at,
		updated_at,
	})
}
