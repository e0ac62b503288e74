// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tasklist account provisioning binary.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tasklist_server::{normalizer_from_config, CommandOutput};
use tasklist_server_db::{create_pool, run_migrations, AccountRepository, PoolSettings};
use tasklist_server_provisioning::AccountProvisioner;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tasklist server - resolves provider logins to local accounts.
#[derive(Parser, Debug)]
#[command(name = "tasklist-server", about = "Tasklist account provisioning", version)]
struct Args {
	/// Config file to read instead of /etc/tasklist/server.toml
	#[arg(long, global = true, env = "TASKLIST_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Resolve a provider login to an account and print its profile
	Login {
		/// Provider registration key, e.g. `google`
		#[arg(long)]
		provider: String,
		/// JSON file with the provider's user-info attributes (stdin if omitted)
		#[arg(long)]
		attributes: Option<PathBuf>,
	},
	/// Print the profile of an existing provider identity
	Whoami {
		#[arg(long)]
		provider: String,
		#[arg(long)]
		subject: String,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => tasklist_server_config::load_config_with_file(path)?,
		None => tasklist_server_config::load_config()?,
	};

	// stdout carries command output, so logs go to stderr
	let json_logs = config.logging.json;
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(json_logs.then(|| {
			tracing_subscriber::fmt::layer()
				.json()
				.with_writer(std::io::stderr)
		}))
		.with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
		.init();

	tracing::debug!(database = %config.database.url, "starting tasklist-server");

	let pool = create_pool(
		&config.database.url,
		PoolSettings {
			max_connections: config.database.max_connections,
			acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
		},
	)
	.await?;
	run_migrations(&pool).await?;

	let normalizer = normalizer_from_config(&config.identity)?;
	let provisioner = AccountProvisioner::new(normalizer, Arc::new(AccountRepository::new(pool.clone())));

	let output = match args.command {
		Command::Login {
			provider,
			attributes,
		} => {
			let input = read_attributes(attributes.as_deref())?;
			let attributes = tasklist_server::parse_attributes(&input)?;
			tasklist_server::login(&provisioner, &provider, &attributes).await?
		}
		Command::Whoami { provider, subject } => {
			tasklist_server::whoami(&provisioner, &provider, &subject).await?
		}
	};

	pool.close().await;
	Ok(emit(output))
}

fn read_attributes(path: Option<&std::path::Path>) -> anyhow::Result<String> {
	match path {
		Some(path) => std::fs::read_to_string(path)
			.with_context(|| format!("failed to read attributes from {}", path.display())),
		None => {
			let mut input = String::new();
			std::io::stdin()
				.read_to_string(&mut input)
				.context("failed to read attributes from stdin")?;
			Ok(input)
		}
	}
}

fn emit(output: CommandOutput) -> ExitCode {
	if output.success {
		println!("{}", output.body);
		ExitCode::SUCCESS
	} else {
		eprintln!("{}", output.body);
		ExitCode::FAILURE
	}
}
