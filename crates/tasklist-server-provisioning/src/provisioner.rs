// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login entry points for the HTTP layer.

use std::sync::Arc;

use tasklist_server_auth::{
	Account, AccountProfile, IdentityNormalizer, ProviderAttributes, ProviderKey,
};
use tasklist_server_db::AccountStore;

use crate::error::ProvisioningError;
use crate::resolver::AccountResolver;

/// Turns completed provider handshakes into local accounts.
#[derive(Clone)]
pub struct AccountProvisioner {
	normalizer: Arc<IdentityNormalizer>,
	resolver: AccountResolver,
	store: Arc<dyn AccountStore>,
}

impl AccountProvisioner {
	pub fn new(normalizer: IdentityNormalizer, store: Arc<dyn AccountStore>) -> Self {
		Self {
			normalizer: Arc::new(normalizer),
			resolver: AccountResolver::new(Arc::clone(&store)),
			store,
		}
	}

	/// Resolve the account for a completed provider login.
	///
	/// # Arguments
	/// * `provider` - Key of the provider registration that handled the login
	/// * `attributes` - User-info attributes returned by the provider
	///
	/// # Errors
	/// A provider response without a usable subject fails before any store
	/// call. See [`AccountResolver::resolve`] for the remaining outcomes.
	#[tracing::instrument(skip(self, attributes))]
	pub async fn login(
		&self,
		provider: &str,
		attributes: &ProviderAttributes,
	) -> Result<Account, ProvisioningError> {
		let identity = self.normalizer.normalize(provider, attributes)?;
		self.resolver.resolve(&identity).await
	}

	/// Look up the profile of an already authenticated identity.
	///
	/// Callers pass the identity explicitly, typically taken from their
	/// session.
	#[tracing::instrument(skip(self, provider_subject))]
	pub async fn current_account(
		&self,
		provider: &str,
		provider_subject: &str,
	) -> Result<Option<AccountProfile>, ProvisioningError> {
		let provider = ProviderKey::parse(provider)?;
		let account = self
			.store
			.get_account_by_provider_identity(&provider, provider_subject)
			.await?;
		if account.is_none() {
			tracing::debug!("no account for authenticated identity");
		}
		Ok(account.map(|a| a.to_profile()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::CountingStore;
	use serde_json::{json, Value};
	use tasklist_server_auth::{AttributeMapping, IdentityError};

	fn attrs(value: Value) -> ProviderAttributes {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected object"),
		}
	}

	#[tokio::test]
	async fn login_without_subject_never_touches_store() {
		let store = CountingStore::new().await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		let err = provisioner
			.login("google", &attrs(json!({ "name": "Ann", "email": "ann@x.com" })))
			.await
			.unwrap_err();

		assert!(matches!(
			err,
			ProvisioningError::Identity(IdentityError::MissingSubject { .. })
		));
		assert_eq!(err.kind(), "missing_subject");
		assert_eq!(store.calls(), 0);
	}

	#[tokio::test]
	async fn login_with_blank_provider_never_touches_store() {
		let store = CountingStore::new().await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		let err = provisioner
			.login("  ", &attrs(json!({ "sub": "s1" })))
			.await
			.unwrap_err();

		assert_eq!(err.kind(), "invalid_provider");
		assert_eq!(store.calls(), 0);
	}

	#[tokio::test]
	async fn login_creates_then_updates() {
		let store = CountingStore::new().await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		let first = provisioner
			.login(
				"Google",
				&attrs(json!({ "sub": "u1", "given_name": "A", "family_name": "B" })),
			)
			.await
			.unwrap();
		assert_eq!(first.display_name, "A B");
		assert_eq!(first.provider.as_str(), "google");
		assert!(first.email.is_none());

		let second = provisioner
			.login(
				"google",
				&attrs(json!({ "sub": "u1", "name": "Ann B", "email": "ann@x.com" })),
			)
			.await
			.unwrap();
		assert_eq!(second.id, first.id);
		assert_eq!(second.display_name, "Ann B");
		assert_eq!(second.email.as_deref(), Some("ann@x.com"));
		assert_eq!(store.count_accounts().await, 1);
	}

	#[tokio::test]
	async fn login_with_github_payload() {
		let store = CountingStore::new().await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		let account = provisioner
			.login("github", &attrs(json!({ "id": 583231, "login": "octocat", "email": null })))
			.await
			.unwrap();

		assert_eq!(account.provider_subject, "583231");
		assert_eq!(account.display_name, "octocat");
		assert!(account.email.is_none());
	}

	#[tokio::test]
	async fn login_uses_provider_override() {
		let store = CountingStore::new().await;
		let normalizer = IdentityNormalizer::default().with_provider(
			ProviderKey::parse("acme").unwrap(),
			AttributeMapping::standard().with_subject_keys(["user_id"]),
		);
		let provisioner = AccountProvisioner::new(normalizer, store.clone());

		let account = provisioner
			.login("acme", &attrs(json!({ "user_id": "a-7", "name": "Ada" })))
			.await
			.unwrap();
		assert_eq!(account.provider_subject, "a-7");
	}

	#[tokio::test]
	async fn login_across_providers_with_same_email_requires_linking() {
		let store = CountingStore::new().await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		provisioner
			.login("google", &attrs(json!({ "sub": "u1", "email": "ann@x.com" })))
			.await
			.unwrap();
		let err = provisioner
			.login("microsoft", &attrs(json!({ "oid": "m1", "preferred_username": "ann@x.com" })))
			.await
			.unwrap_err();

		assert!(err.is_policy_rejection());
		assert_eq!(err.kind(), "account_linking_required");
		assert_eq!(store.count_accounts().await, 1);
	}

	#[tokio::test]
	async fn current_account_returns_profile() {
		let store = CountingStore::new().await;
		let seeded = store.seed("google", "u1", "Ann", Some("ann@x.com")).await;
		let provisioner = AccountProvisioner::new(IdentityNormalizer::default(), store.clone());

		let profile = provisioner
			.current_account("GOOGLE", "u1")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(profile, seeded.to_profile());

		let missing = provisioner.current_account("google", "nobody").await.unwrap();
		assert!(missing.is_none());
	}
}
