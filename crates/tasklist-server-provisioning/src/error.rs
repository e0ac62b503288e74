// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tasklist_server_auth::{AccountId, IdentityError, ProviderKey};
use tasklist_server_db::DbError;

/// Errors that can occur during account provisioning.
///
/// Messages never carry email addresses.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	/// The provider response could not be turned into an identity.
	#[error(transparent)]
	Identity(#[from] IdentityError),

	/// The login's new email already belongs to another account. The account
	/// was left unchanged.
	#[error("email reported by the provider is already used by another account (account {account_id} not updated)")]
	EmailConflict { account_id: AccountId },

	/// Another identity already owns this email. Signing in requires an
	/// explicit account-linking step.
	#[error("an account with this email already exists; link it before signing in with `{provider}`")]
	AccountLinkingRequired { provider: ProviderKey },

	#[error("database error: {0}")]
	Database(#[from] DbError),
}

impl ProvisioningError {
	/// Stable snake_case tag for logs and API error bodies.
	pub fn kind(&self) -> &'static str {
		match self {
			ProvisioningError::Identity(IdentityError::EmptyProvider) => "invalid_provider",
			ProvisioningError::Identity(IdentityError::MissingSubject { .. }) => "missing_subject",
			ProvisioningError::EmailConflict { .. } => "email_conflict",
			ProvisioningError::AccountLinkingRequired { .. } => "account_linking_required",
			ProvisioningError::Database(_) => "database",
		}
	}

	/// True for outcomes that are decisions about the caller's login rather
	/// than faults: surface them verbatim, retrying will not help.
	pub fn is_policy_rejection(&self) -> bool {
		matches!(
			self,
			ProvisioningError::EmailConflict { .. } | ProvisioningError::AccountLinkingRequired { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kinds_are_stable() {
		let google = ProviderKey::parse("google").unwrap();
		let cases = [
			(
				ProvisioningError::Identity(IdentityError::EmptyProvider),
				"invalid_provider",
			),
			(
				ProvisioningError::Identity(IdentityError::MissingSubject {
					provider: google.clone(),
					tried: vec!["sub".to_string()],
				}),
				"missing_subject",
			),
			(
				ProvisioningError::EmailConflict {
					account_id: AccountId::generate(),
				},
				"email_conflict",
			),
			(
				ProvisioningError::AccountLinkingRequired { provider: google },
				"account_linking_required",
			),
			(
				ProvisioningError::Database(DbError::NotFound("account".to_string())),
				"database",
			),
		];
		for (err, kind) in cases {
			assert_eq!(err.kind(), kind);
		}
	}

	#[test]
	fn only_conflicts_are_policy_rejections() {
		let google = ProviderKey::parse("google").unwrap();
		assert!(ProvisioningError::AccountLinkingRequired { provider: google }.is_policy_rejection());
		assert!(ProvisioningError::EmailConflict {
			account_id: AccountId::generate()
		}
		.is_policy_rejection());
		assert!(!ProvisioningError::Identity(IdentityError::EmptyProvider).is_policy_rejection());
		assert!(
			!ProvisioningError::Database(DbError::Internal("boom".to_string())).is_policy_rejection()
		);
	}
}
