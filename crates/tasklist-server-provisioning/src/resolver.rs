// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution of canonical identities to local accounts.
//!
//! Each login is resolved with a lookup → compare → write sequence:
//!
//! | state             | condition                                   | outcome                    |
//! |-------------------|---------------------------------------------|----------------------------|
//! | `EXISTING`        | account found for `(provider, subject)`     | update changed fields      |
//! | `EMAIL_COLLISION` | no such account, email owned by another one | `AccountLinkingRequired`   |
//! | `NEW`             | neither                                     | create account             |
//!
//! The unique indexes on the store are what actually keep identities and
//! emails distinct. The lookups above only pick the common path; when a
//! concurrent login wins the race, the resulting constraint violation is
//! mapped back onto the same outcomes instead of surfacing as a store error.

use std::sync::Arc;

use tasklist_server_auth::{Account, CanonicalIdentity, NewAccount};
use tasklist_server_db::{AccountStore, DbError, UniqueConstraint};
use tracing::{debug, info, warn};

use crate::error::ProvisioningError;

/// How a resolved account came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	Created(Account),
	Updated(Account),
	Unchanged(Account),
}

impl Resolution {
	pub fn account(&self) -> &Account {
		match self {
			Resolution::Created(a) | Resolution::Updated(a) | Resolution::Unchanged(a) => a,
		}
	}

	pub fn into_account(self) -> Account {
		match self {
			Resolution::Created(a) | Resolution::Updated(a) | Resolution::Unchanged(a) => a,
		}
	}
}

/// Maps canonical identities onto accounts in an [`AccountStore`].
#[derive(Clone)]
pub struct AccountResolver {
	store: Arc<dyn AccountStore>,
}

impl AccountResolver {
	pub fn new(store: Arc<dyn AccountStore>) -> Self {
		Self { store }
	}

	/// Resolve an identity to its account, creating or updating as needed.
	///
	/// # Errors
	/// - [`ProvisioningError::EmailConflict`] if the identity's account exists
	///   and its new email belongs to a different account
	/// - [`ProvisioningError::AccountLinkingRequired`] if the identity is new
	///   and its email belongs to a different account
	/// - [`ProvisioningError::Database`] for store faults
	///
	/// No failure path writes to the store.
	pub async fn resolve(&self, identity: &CanonicalIdentity) -> Result<Account, ProvisioningError> {
		self.resolve_detailed(identity).await.map(Resolution::into_account)
	}

	/// Like [`resolve`](Self::resolve), but reports whether the account was
	/// created, updated or left alone.
	#[tracing::instrument(skip(self, identity), fields(provider = %identity.provider))]
	pub async fn resolve_detailed(
		&self,
		identity: &CanonicalIdentity,
	) -> Result<Resolution, ProvisioningError> {
		if let Some(existing) = self
			.store
			.get_account_by_provider_identity(&identity.provider, &identity.provider_subject)
			.await?
		{
			return self.reconcile(existing, identity).await;
		}

		if let Some(email) = identity.email.as_deref() {
			if let Some(owner) = self.store.get_account_by_email(email).await? {
				warn!(
					owner_account_id = %owner.id,
					"email already owned by another identity, account linking required"
				);
				return Err(ProvisioningError::AccountLinkingRequired {
					provider: identity.provider.clone(),
				});
			}
		}

		match self.store.create_account(&NewAccount::from(identity)).await {
			Ok(account) => {
				info!(account_id = %account.id, "account created");
				Ok(Resolution::Created(account))
			}
			Err(DbError::UniqueViolation(constraint)) => {
				self.recover_lost_insert(identity, constraint).await
			}
			Err(e) => Err(e.into()),
		}
	}

	/// An insert hit a unique index, so some other write landed between our
	/// lookups and the insert. Re-read once and settle on the same outcomes
	/// the lookups would have produced.
	async fn recover_lost_insert(
		&self,
		identity: &CanonicalIdentity,
		constraint: UniqueConstraint,
	) -> Result<Resolution, ProvisioningError> {
		warn!(constraint = %constraint, "account insert lost a race, re-reading");

		if let Some(existing) = self
			.store
			.get_account_by_provider_identity(&identity.provider, &identity.provider_subject)
			.await?
		{
			return self.reconcile(existing, identity).await;
		}

		match constraint {
			UniqueConstraint::ProviderIdentity | UniqueConstraint::Email => {
				Err(ProvisioningError::AccountLinkingRequired {
					provider: identity.provider.clone(),
				})
			}
			other => Err(DbError::UniqueViolation(other).into()),
		}
	}

	/// Apply provider-reported changes to an existing account.
	///
	/// An absent email never clears the stored one.
	async fn reconcile(
		&self,
		existing: Account,
		identity: &CanonicalIdentity,
	) -> Result<Resolution, ProvisioningError> {
		let name_changed = existing.display_name != identity.display_name;
		let new_email = identity
			.email
			.as_ref()
			.filter(|email| existing.email.as_ref() != Some(*email));

		if !name_changed && new_email.is_none() {
			debug!(account_id = %existing.id, "account up to date");
			return Ok(Resolution::Unchanged(existing));
		}

		if let Some(email) = new_email {
			if let Some(owner) = self.store.get_account_by_email(email).await? {
				if owner.id != existing.id {
					warn!(
						account_id = %existing.id,
						owner_account_id = %owner.id,
						"email update rejected, address owned by another account"
					);
					return Err(ProvisioningError::EmailConflict {
						account_id: existing.id,
					});
				}
			}
		}

		let account_id = existing.id;
		let mut changed = existing;
		if name_changed {
			changed.display_name = identity.display_name.clone();
		}
		if let Some(email) = new_email {
			changed.email = Some(email.clone());
		}

		match self.store.update_account(&changed).await {
			Ok(account) => {
				info!(
					account_id = %account.id,
					name_changed,
					email_changed = new_email.is_some(),
					"account updated"
				);
				Ok(Resolution::Updated(account))
			}
			Err(DbError::UniqueViolation(UniqueConstraint::Email)) => {
				warn!(account_id = %account_id, "email update lost a race to another account");
				Err(ProvisioningError::EmailConflict { account_id })
			}
			Err(e) => Err(e.into()),
		}
	}
}
