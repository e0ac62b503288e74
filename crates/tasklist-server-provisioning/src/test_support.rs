// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tasklist_server_auth::{Account, NewAccount, ProviderKey};
use tasklist_server_db::testing::create_account_test_pool;
use tasklist_server_db::{AccountRepository, AccountStore, DbError};

/// Store wrapper that counts reads and writes against an in-memory repository.
pub struct CountingStore {
	pool: SqlitePool,
	inner: AccountRepository,
	reads: AtomicUsize,
	writes: AtomicUsize,
}

impl CountingStore {
	pub async fn new() -> Arc<Self> {
		let pool = create_account_test_pool().await;
		Arc::new(Self {
			inner: AccountRepository::new(pool.clone()),
			pool,
			reads: AtomicUsize::new(0),
			writes: AtomicUsize::new(0),
		})
	}

	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}

	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	pub fn calls(&self) -> usize {
		self.reads() + self.writes()
	}

	pub fn reset(&self) {
		self.reads.store(0, Ordering::SeqCst);
		self.writes.store(0, Ordering::SeqCst);
	}

	/// Insert directly, bypassing the counters.
	pub async fn seed(&self, provider: &str, subject: &str, name: &str, email: Option<&str>) -> Account {
		self
			.inner
			.create_account(&NewAccount {
				provider: ProviderKey::parse(provider).unwrap(),
				provider_subject: subject.to_string(),
				display_name: name.to_string(),
				email: email.map(str::to_string),
			})
			.await
			.unwrap()
	}

	/// Read directly, bypassing the counters.
	pub async fn lookup(&self, provider: &str, subject: &str) -> Option<Account> {
		self
			.inner
			.get_account_by_provider_identity(&ProviderKey::parse(provider).unwrap(), subject)
			.await
			.unwrap()
	}

	pub async fn count_accounts(&self) -> usize {
		let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
			.fetch_one(&self.pool)
			.await
			.unwrap();
		n as usize
	}
}

#[async_trait]
impl AccountStore for CountingStore {
	async fn get_account_by_provider_identity(
		&self,
		provider: &ProviderKey,
		provider_subject: &str,
	) -> Result<Option<Account>, DbError> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self
			.inner
			.get_account_by_provider_identity(provider, provider_subject)
			.await
	}

	async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.inner.get_account_by_email(email).await
	}

	async fn create_account(&self, account: &NewAccount) -> Result<Account, DbError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.inner.create_account(account).await
	}

	async fn update_account(&self, account: &Account) -> Result<Account, DbError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.inner.update_account(account).await
	}
}

/// Store whose reads lag behind its writes, as if another login committed
/// between the resolver's lookups and its write.
///
/// The first identity lookup and every email lookup report nothing. Writes
/// and later identity lookups hit the real table, so the store's unique
/// indexes fire.
pub struct StaleReadStore {
	backing: Arc<CountingStore>,
	identity_hidden: AtomicBool,
}

impl StaleReadStore {
	pub async fn new() -> Arc<Self> {
		Arc::new(Self {
			backing: CountingStore::new().await,
			identity_hidden: AtomicBool::new(true),
		})
	}

	pub fn backing(&self) -> &CountingStore {
		&self.backing
	}
}

#[async_trait]
impl AccountStore for StaleReadStore {
	async fn get_account_by_provider_identity(
		&self,
		provider: &ProviderKey,
		provider_subject: &str,
	) -> Result<Option<Account>, DbError> {
		if self.identity_hidden.swap(false, Ordering::SeqCst) {
			return Ok(None);
		}
		self
			.backing
			.get_account_by_provider_identity(provider, provider_subject)
			.await
	}

	async fn get_account_by_email(&self, _email: &str) -> Result<Option<Account>, DbError> {
		Ok(None)
	}

	async fn create_account(&self, account: &NewAccount) -> Result<Account, DbError> {
		self.backing.create_account(account).await
	}

	async fn update_account(&self, account: &Account) -> Result<Account, DbError> {
		self.backing.update_account(account).await
	}
}
