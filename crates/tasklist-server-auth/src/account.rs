// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account types.
//!
//! This module provides:
//! - [`Account`] - the persisted local user record, keyed by provider identity
//! - [`NewAccount`] - the fields needed to provision an account
//! - [`AccountProfile`] - public view of an account for API responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::CanonicalIdentity;
use crate::types::{AccountId, ProviderKey};

/// A local account.
///
/// An account is bound to exactly one provider identity for its whole life:
/// `provider` and `provider_subject` are set at creation and never rewritten.
///
/// # PII Handling
///
/// `display_name` and `email` are provider-supplied PII and should be kept
/// out of logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	/// Store-assigned identifier.
	pub id: AccountId,

	/// Provider that issued the identity.
	pub provider: ProviderKey,

	/// The user's stable identifier at the provider.
	pub provider_subject: String,

	/// Display name, tracks the provider's current value.
	pub display_name: String,

	/// Contact email. Unique across accounts when present.
	pub email: Option<String>,

	pub created_at: DateTime<Utc>,

	pub updated_at: DateTime<Utc>,
}

impl Account {
	/// Creates a public profile view of this account.
	pub fn to_profile(&self) -> AccountProfile {
		AccountProfile {
			id: self.id,
			provider: self.provider.clone(),
			display_name: self.display_name.clone(),
			email: self.email.clone(),
		}
	}
}

/// Fields for an account that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
	pub provider: ProviderKey,
	pub provider_subject: String,
	pub display_name: String,
	pub email: Option<String>,
}

impl From<&CanonicalIdentity> for NewAccount {
	fn from(identity: &CanonicalIdentity) -> Self {
		Self {
			provider: identity.provider.clone(),
			provider_subject: identity.provider_subject.clone(),
			display_name: identity.display_name.clone(),
			email: identity.email.clone(),
		}
	}
}

/// Public view of an account, as returned by the "current user" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountProfile {
	pub id: AccountId,
	pub provider: ProviderKey,
	pub display_name: String,
	pub email: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use uuid::Uuid;

	fn make_test_account() -> Account {
		Account {
			id: AccountId::generate(),
			provider: ProviderKey::parse("google").unwrap(),
			provider_subject: "u1".to_string(),
			display_name: "Ann".to_string(),
			email: Some("ann@x.com".to_string()),
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[test]
	fn to_profile_copies_public_fields() {
		let account = make_test_account();
		let profile = account.to_profile();

		assert_eq!(profile.id, account.id);
		assert_eq!(profile.provider, account.provider);
		assert_eq!(profile.display_name, "Ann");
		assert_eq!(profile.email.as_deref(), Some("ann@x.com"));
	}

	#[test]
	fn new_account_from_identity() {
		let identity = CanonicalIdentity {
			provider: ProviderKey::parse("github").unwrap(),
			provider_subject: "42".to_string(),
			display_name: "octocat".to_string(),
			email: None,
		};

		let new = NewAccount::from(&identity);
		assert_eq!(new.provider.as_str(), "github");
		assert_eq!(new.provider_subject, "42");
		assert_eq!(new.display_name, "octocat");
		assert!(new.email.is_none());
	}

	#[test]
	fn profile_serializes_correctly() {
		let profile = AccountProfile {
			id: AccountId::new(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()),
			provider: ProviderKey::parse("google").unwrap(),
			display_name: "Ann".to_string(),
			email: None,
		};

		let json = serde_json::to_string(&profile).unwrap();
		assert!(json.contains("\"provider\":\"google\""));
		assert!(json.contains("\"display_name\":\"Ann\""));
		assert!(json.contains("\"email\":null"));
	}
}
