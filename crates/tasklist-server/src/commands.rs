// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `login` and `whoami` command handlers.
//!
//! Handlers return what to print instead of printing, so they can be driven
//! from tests.

use anyhow::Context;
use serde::Serialize;
use tasklist_server_auth::ProviderAttributes;
use tasklist_server_provisioning::{AccountProvisioner, ProvisioningError};

/// Text for stdout plus whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
	pub body: String,
	pub success: bool,
}

impl CommandOutput {
	fn ok(body: String) -> Self {
		Self {
			body,
			success: true,
		}
	}

	fn failed(body: String) -> Self {
		Self {
			body,
			success: false,
		}
	}
}

#[derive(Serialize)]
struct ErrorBody<'a> {
	error: &'a str,
	message: String,
}

/// Parse a provider attribute bag. The input must be a JSON object.
pub fn parse_attributes(input: &str) -> anyhow::Result<ProviderAttributes> {
	let value: serde_json::Value =
		serde_json::from_str(input).context("attributes are not valid JSON")?;
	match value {
		serde_json::Value::Object(map) => Ok(map),
		other => anyhow::bail!("attributes must be a JSON object, got {}", json_type(&other)),
	}
}

fn json_type(value: &serde_json::Value) -> &'static str {
	match value {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "a boolean",
		serde_json::Value::Number(_) => "a number",
		serde_json::Value::String(_) => "a string",
		serde_json::Value::Array(_) => "an array",
		serde_json::Value::Object(_) => "an object",
	}
}

/// Run a provider login and render the resulting profile.
///
/// Identity and policy rejections become a failed [`CommandOutput`] carrying
/// the error kind. Store failures are returned as errors.
pub async fn login(
	provisioner: &AccountProvisioner,
	provider: &str,
	attributes: &ProviderAttributes,
) -> anyhow::Result<CommandOutput> {
	match provisioner.login(provider, attributes).await {
		Ok(account) => {
			let body = serde_json::to_string_pretty(&account.to_profile())?;
			Ok(CommandOutput::ok(body))
		}
		Err(ProvisioningError::Database(e)) => Err(e).context("account store failed during login"),
		Err(e) => {
			tracing::warn!(kind = e.kind(), "login rejected");
			let body = serde_json::to_string_pretty(&ErrorBody {
				error: e.kind(),
				message: e.to_string(),
			})?;
			Ok(CommandOutput::failed(body))
		}
	}
}

/// Render the profile of an existing identity.
pub async fn whoami(
	provisioner: &AccountProvisioner,
	provider: &str,
	subject: &str,
) -> anyhow::Result<CommandOutput> {
	let profile = provisioner
		.current_account(provider, subject)
		.await
		.context("failed to look up account")?;
	match profile {
		Some(profile) => Ok(CommandOutput::ok(serde_json::to_string_pretty(&profile)?)),
		None => Ok(CommandOutput::failed(format!(
			"no account for {provider} identity {subject}"
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use tasklist_server_auth::IdentityNormalizer;
	use tasklist_server_db::testing::create_account_test_pool;
	use tasklist_server_db::AccountRepository;

	async fn provisioner() -> AccountProvisioner {
		let pool = create_account_test_pool().await;
		AccountProvisioner::new(
			IdentityNormalizer::default(),
			Arc::new(AccountRepository::new(pool)),
		)
	}

	fn body_json(output: &CommandOutput) -> serde_json::Value {
		serde_json::from_str(&output.body).unwrap()
	}

	#[test]
	fn parse_attributes_accepts_objects() {
		let attrs = parse_attributes(r#"{"sub": "1", "name": "Ada"}"#).unwrap();
		assert_eq!(attrs.len(), 2);
	}

	#[test]
	fn parse_attributes_rejects_non_objects() {
		let err = parse_attributes("[1, 2]").unwrap_err();
		assert!(err.to_string().contains("an array"));

		assert!(parse_attributes("{not json").is_err());
	}

	#[tokio::test]
	async fn login_prints_profile() {
		let provisioner = provisioner().await;
		let attrs = parse_attributes(r#"{"sub": "42", "name": "Ada", "email": "ada@example.com"}"#).unwrap();

		let output = login(&provisioner, "Google", &attrs).await.unwrap();
		assert!(output.success);

		let profile = body_json(&output);
		assert_eq!(profile["provider"], "google");
		assert_eq!(profile["display_name"], "Ada");
		assert_eq!(profile["email"], "ada@example.com");
	}

	#[tokio::test]
	async fn login_is_idempotent() {
		let provisioner = provisioner().await;
		let attrs = parse_attributes(r#"{"id": 7, "login": "octocat"}"#).unwrap();

		let first = body_json(&login(&provisioner, "github", &attrs).await.unwrap());
		let second = body_json(&login(&provisioner, "github", &attrs).await.unwrap());
		assert_eq!(first["id"], second["id"]);
	}

	#[tokio::test]
	async fn missing_subject_fails_with_kind() {
		let provisioner = provisioner().await;
		let attrs = parse_attributes(r#"{"name": "Nobody"}"#).unwrap();

		let output = login(&provisioner, "google", &attrs).await.unwrap();
		assert!(!output.success);
		assert_eq!(body_json(&output)["error"], "missing_subject");
	}

	#[tokio::test]
	async fn linking_required_fails_with_kind() {
		let provisioner = provisioner().await;
		let google = parse_attributes(r#"{"sub": "g-1", "email": "ada@example.com"}"#).unwrap();
		let github = parse_attributes(r#"{"id": 1, "email": "ada@example.com"}"#).unwrap();

		assert!(login(&provisioner, "google", &google).await.unwrap().success);

		let output = login(&provisioner, "github", &github).await.unwrap();
		assert!(!output.success);
		let body = body_json(&output);
		assert_eq!(body["error"], "account_linking_required");
		assert!(!body["message"].as_str().unwrap().contains("ada@example.com"));
	}

	#[tokio::test]
	async fn whoami_reports_known_and_unknown_identities() {
		let provisioner = provisioner().await;
		let attrs = parse_attributes(r#"{"sub": "42", "name": "Ada"}"#).unwrap();
		login(&provisioner, "google", &attrs).await.unwrap();

		let known = whoami(&provisioner, "google", "42").await.unwrap();
		assert!(known.success);
		assert_eq!(body_json(&known)["display_name"], "Ada");

		let unknown = whoami(&provisioner, "google", "43").await.unwrap();
		assert!(!unknown.success);
		assert!(unknown.body.contains("no account"));
	}
}
