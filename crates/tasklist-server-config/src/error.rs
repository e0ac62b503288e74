// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file {}: {source}", .path.display())]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse TOML config at {}: {source}", .path.display())]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Validation error: {0}")]
	Validation(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_messages() {
		let err = ConfigError::InvalidValue {
			key: "TASKLIST_SERVER_DATABASE_MAX_CONNECTIONS".to_string(),
			message: "invalid u32 value 'many'".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Invalid value for TASKLIST_SERVER_DATABASE_MAX_CONNECTIONS: invalid u32 value 'many'"
		);

		let err = ConfigError::Validation("database.url must not be empty".to_string());
		assert_eq!(err.to_string(), "Validation error: database.url must not be empty");
	}
}
