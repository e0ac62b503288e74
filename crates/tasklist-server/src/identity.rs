// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tasklist_server_auth::{AttributeMapping, IdentityError, IdentityNormalizer, ProviderKey};
use tasklist_server_config::{IdentityConfig, ProviderMappingConfig};

/// Build the normalizer from the `identity.providers` overrides.
///
/// # Errors
/// Returns `IdentityError::EmptyProvider` for a blank provider key.
pub fn normalizer_from_config(config: &IdentityConfig) -> Result<IdentityNormalizer, IdentityError> {
	let mut normalizer = IdentityNormalizer::default();
	for (key, overrides) in &config.providers {
		let provider = ProviderKey::parse(key)?;
		tracing::debug!(provider = %provider, "using attribute mapping override");
		normalizer = normalizer.with_provider(provider, mapping_from(overrides));
	}
	Ok(normalizer)
}

fn mapping_from(config: &ProviderMappingConfig) -> AttributeMapping {
	let mut mapping = AttributeMapping::standard();
	if let Some(keys) = &config.subject_keys {
		mapping = mapping.with_subject_keys(keys.iter().cloned());
	}
	if let Some(keys) = &config.name_keys {
		mapping = mapping.with_name_keys(keys.iter().cloned());
	}
	if let Some(keys) = &config.email_keys {
		mapping = mapping.with_email_keys(keys.iter().cloned());
	}
	mapping
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::collections::BTreeMap;

	fn config(key: &str, mapping: ProviderMappingConfig) -> IdentityConfig {
		IdentityConfig {
			providers: BTreeMap::from([(key.to_string(), mapping)]),
		}
	}

	#[test]
	fn empty_config_uses_standard_mapping() {
		let normalizer = normalizer_from_config(&IdentityConfig::default()).unwrap();
		let github = ProviderKey::parse("github").unwrap();
		assert_eq!(normalizer.mapping_for(&github), &AttributeMapping::standard());
	}

	#[test]
	fn override_applies_to_its_provider_only() {
		let normalizer = normalizer_from_config(&config(
			"Acme",
			ProviderMappingConfig {
				subject_keys: Some(vec!["user_id".to_string()]),
				..Default::default()
			},
		))
		.unwrap();

		let attrs = json!({ "user_id": "u-1", "sub": "ignored" });
		let attrs = attrs.as_object().unwrap();

		let acme = normalizer.normalize("acme", attrs).unwrap();
		assert_eq!(acme.provider_subject, "u-1");

		let other = normalizer.normalize("okta", attrs).unwrap();
		assert_eq!(other.provider_subject, "ignored");
	}

	#[test]
	fn name_override_keeps_full_name_fallback() {
		let normalizer = normalizer_from_config(&config(
			"acme",
			ProviderMappingConfig {
				name_keys: Some(vec!["nickname".to_string()]),
				..Default::default()
			},
		))
		.unwrap();

		let attrs = json!({ "sub": "1", "given_name": "Ada", "family_name": "Lovelace" });
		let identity = normalizer.normalize("acme", attrs.as_object().unwrap()).unwrap();
		assert_eq!(identity.display_name, "Ada Lovelace");
	}

	#[test]
	fn blank_provider_key_is_rejected() {
		let err = normalizer_from_config(&config("  ", ProviderMappingConfig::default())).unwrap_err();
		assert_eq!(err, IdentityError::EmptyProvider);
	}
}
