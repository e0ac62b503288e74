// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute mapping and identity normalization.
//!
//! Providers disagree on where they put the subject, name and email of a
//! user. Rather than branching per provider, each canonical field has an
//! ordered list of sources and the first usable one wins:
//!
//! | field        | default chain                                          |
//! |--------------|--------------------------------------------------------|
//! | subject      | `sub`, `id`, `oid`                                     |
//! | display name | `name`, `login`, `given_name` + `family_name`, subject |
//! | email        | `email`, `preferred_username` if it contains `@`       |
//!
//! Supporting a new provider layout means adding entries to a chain, either
//! in [`AttributeMapping::standard`] or as a per-provider override on
//! [`IdentityNormalizer`].

use std::collections::HashMap;

use crate::identity::{attribute_text, CanonicalIdentity, IdentityError, ProviderAttributes};
use crate::types::ProviderKey;

/// A source for the display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
	/// Use the attribute as-is.
	Key(String),
	/// Join two attributes with a space. Both must be present.
	FullName { given: String, family: String },
}

/// A source for the email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailSource {
	/// Use the attribute as-is.
	Key(String),
	/// Use the attribute only if it contains `@`.
	EmailLike(String),
}

/// Ordered fallback chains for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMapping {
	subject: Vec<String>,
	display_name: Vec<NameSource>,
	email: Vec<EmailSource>,
}

impl Default for AttributeMapping {
	fn default() -> Self {
		Self::standard()
	}
}

impl AttributeMapping {
	/// Chains covering OIDC providers (Google, Microsoft) as well as
	/// Facebook and GitHub style user-info payloads.
	pub fn standard() -> Self {
		Self {
			subject: vec!["sub".to_string(), "id".to_string(), "oid".to_string()],
			display_name: vec![
				NameSource::Key("name".to_string()),
				NameSource::Key("login".to_string()),
				NameSource::FullName {
					given: "given_name".to_string(),
					family: "family_name".to_string(),
				},
			],
			email: vec![
				EmailSource::Key("email".to_string()),
				EmailSource::EmailLike("preferred_username".to_string()),
			],
		}
	}

	/// Replace the subject chain.
	pub fn with_subject_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.subject = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Replace the direct name keys, keeping any composed full-name sources
	/// as later fallbacks.
	pub fn with_name_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let composed = self
			.display_name
			.into_iter()
			.filter(|source| matches!(source, NameSource::FullName { .. }));
		self.display_name = keys
			.into_iter()
			.map(|k| NameSource::Key(k.into()))
			.chain(composed)
			.collect();
		self
	}

	/// Replace the direct email keys, keeping the email-like fallbacks.
	pub fn with_email_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let email_like = self
			.email
			.into_iter()
			.filter(|source| matches!(source, EmailSource::EmailLike(_)));
		self.email = keys
			.into_iter()
			.map(|k| EmailSource::Key(k.into()))
			.chain(email_like)
			.collect();
		self
	}

	fn subject(&self, attributes: &ProviderAttributes) -> Option<String> {
		self.subject
			.iter()
			.find_map(|key| attribute_text(attributes, key))
	}

	fn display_name(&self, attributes: &ProviderAttributes) -> Option<String> {
		self.display_name.iter().find_map(|source| match source {
			NameSource::Key(key) => attribute_text(attributes, key),
			NameSource::FullName { given, family } => {
				let given = attribute_text(attributes, given)?;
				let family = attribute_text(attributes, family)?;
				Some(format!("{given} {family}"))
			}
		})
	}

	fn email(&self, attributes: &ProviderAttributes) -> Option<String> {
		self.email.iter().find_map(|source| match source {
			EmailSource::Key(key) => attribute_text(attributes, key),
			EmailSource::EmailLike(key) => {
				attribute_text(attributes, key).filter(|value| value.contains('@'))
			}
		})
	}

	/// Derive a canonical identity from a provider's attributes.
	///
	/// # Errors
	/// Returns [`IdentityError::MissingSubject`] if no subject source yields a
	/// value.
	pub fn normalize(
		&self,
		provider: ProviderKey,
		attributes: &ProviderAttributes,
	) -> Result<CanonicalIdentity, IdentityError> {
		let Some(provider_subject) = self.subject(attributes) else {
			return Err(IdentityError::MissingSubject {
				provider,
				tried: self.subject.clone(),
			});
		};

		let display_name = self
			.display_name(attributes)
			.unwrap_or_else(|| provider_subject.clone());
		let email = self.email(attributes);

		Ok(CanonicalIdentity {
			provider,
			provider_subject,
			display_name,
			email,
		})
	}
}

/// Normalizer with a default mapping and optional per-provider overrides.
#[derive(Debug, Clone, Default)]
pub struct IdentityNormalizer {
	default: AttributeMapping,
	overrides: HashMap<ProviderKey, AttributeMapping>,
}

impl IdentityNormalizer {
	/// Use a dedicated mapping for one provider.
	pub fn with_provider(mut self, provider: ProviderKey, mapping: AttributeMapping) -> Self {
		self.overrides.insert(provider, mapping);
		self
	}

	pub fn mapping_for(&self, provider: &ProviderKey) -> &AttributeMapping {
		self.overrides.get(provider).unwrap_or(&self.default)
	}

	/// Parse the provider key and normalize the attributes with the mapping
	/// registered for it.
	pub fn normalize(
		&self,
		provider: &str,
		attributes: &ProviderAttributes,
	) -> Result<CanonicalIdentity, IdentityError> {
		let provider = ProviderKey::parse(provider)?;
		let result = self.mapping_for(&provider).normalize(provider, attributes);
		if let Err(IdentityError::MissingSubject { provider, .. }) = &result {
			tracing::warn!(provider = %provider, attribute_count = attributes.len(), "provider response has no subject");
		}
		result
	}
}

/// Normalize with the standard mapping.
pub fn normalize(
	provider: &str,
	attributes: &ProviderAttributes,
) -> Result<CanonicalIdentity, IdentityError> {
	let provider = ProviderKey::parse(provider)?;
	AttributeMapping::standard().normalize(provider, attributes)
}
