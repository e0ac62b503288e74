// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity normalization configuration.
//!
//! Per-provider overrides of the attribute keys read from provider
//! responses. TOML only:
//!
//! ```toml
//! [identity.providers.acme]
//! subject_keys = ["user_id"]
//! name_keys = ["nickname", "name"]
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigError;

/// Attribute key overrides for one provider. Unset lists keep the default
/// chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderMappingConfig {
	#[serde(default)]
	pub subject_keys: Option<Vec<String>>,
	#[serde(default)]
	pub name_keys: Option<Vec<String>>,
	#[serde(default)]
	pub email_keys: Option<Vec<String>>,
}

impl ProviderMappingConfig {
	fn validate(&self, provider: &str) -> Result<(), ConfigError> {
		let lists = [
			("subject_keys", &self.subject_keys),
			("name_keys", &self.name_keys),
			("email_keys", &self.email_keys),
		];
		for (name, keys) in lists {
			let Some(keys) = keys else { continue };
			if keys.is_empty() {
				return Err(ConfigError::Validation(format!(
					"identity.providers.{provider}.{name} must not be empty"
				)));
			}
			if keys.iter().any(|k| k.trim().is_empty()) {
				return Err(ConfigError::Validation(format!(
					"identity.providers.{provider}.{name} contains a blank key"
				)));
			}
		}
		Ok(())
	}
}

/// Identity configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityConfig {
	pub providers: BTreeMap<String, ProviderMappingConfig>,
}

impl IdentityConfig {
	/// Provider keys are matched trimmed and case-insensitively, so two
	/// entries that differ only in case or surrounding whitespace collide.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut seen: BTreeMap<String, &str> = BTreeMap::new();
		for (provider, mapping) in &self.providers {
			let normalized = provider.trim().to_ascii_lowercase();
			if normalized.is_empty() {
				return Err(ConfigError::Validation(
					"identity.providers contains a blank provider key".to_string(),
				));
			}
			if let Some(previous) = seen.insert(normalized, provider) {
				return Err(ConfigError::Validation(format!(
					"identity.providers.{previous} and identity.providers.{provider} name the same provider"
				)));
			}
			mapping.validate(provider)?;
		}
		Ok(())
	}
}

/// Identity configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfigLayer {
	#[serde(default)]
	pub providers: Option<BTreeMap<String, ProviderMappingConfig>>,
}

impl IdentityConfigLayer {
	/// Provider entries from `other` replace entries with the same key.
	pub fn merge(&mut self, other: IdentityConfigLayer) {
		if let Some(incoming) = other.providers {
			self.providers.get_or_insert_with(BTreeMap::new).extend(incoming);
		}
	}

	pub fn finalize(self) -> IdentityConfig {
		IdentityConfig {
			providers: self.providers.unwrap_or_default(),
		}
	}
}
