// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical identities derived from provider attribute bags.

use serde::Serialize;
use serde_json::Value;

use crate::types::ProviderKey;

/// Raw user-info attributes returned by an OAuth2 provider.
pub type ProviderAttributes = serde_json::Map<String, Value>;

/// The normalized identity behind a single login.
///
/// Produced fresh for each login and never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalIdentity {
	pub provider: ProviderKey,

	/// Provider-scoped stable user identifier. Never empty.
	pub provider_subject: String,

	/// Never empty; falls back to the subject when the provider sends no name.
	pub display_name: String,

	/// Only what the provider reported. Never synthesized.
	pub email: Option<String>,
}

/// Errors produced while deriving a canonical identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
	#[error("identity provider key is empty")]
	EmptyProvider,

	#[error("provider `{provider}` returned no usable subject identifier (tried: {})", .tried.join(", "))]
	MissingSubject {
		provider: ProviderKey,
		tried: Vec<String>,
	},
}

/// Read an attribute as text.
///
/// Strings are trimmed and must be non-empty; numbers are rendered in
/// decimal. Every other JSON type counts as absent.
pub fn attribute_text(attributes: &ProviderAttributes, key: &str) -> Option<String> {
	match attributes.get(key)? {
		Value::String(s) => {
			let trimmed = s.trim();
			(!trimmed.is_empty()).then(|| trimmed.to_string())
		}
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}
