// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grove server administrative binary.

use clap::{Parser, Subcommand};
use grove_server_auth::UserId;
use grove_server_db::{create_pool, run_migrations, UserRepository};
use uuid::Uuid;

mod report;

/// Grove server - permission core administration.
#[derive(Parser, Debug)]
#[command(name = "grove-server", about = "Grove permission core", version)]
struct Args {
	/// Defaults to `migrate` when omitted
	#[command(subcommand)]
	command: Option<Command>,

	/// Path to a TOML config file (defaults to /etc/grove/server.toml)
	#[arg(long, global = true)]
	config: Option<std::path::PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Apply database migrations
	Migrate,
	/// Print a user's effective roles as JSON
	Roles {
		/// User ID
		user_id: Uuid,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => grove_server_config::load_config_with_file(path)?,
		None => grove_server_config::load_config()?,
	};

	grove_server_config::init_tracing(&config.logging);

	tracing::info!(
		database = %config.database.url,
		record_checks = config.permissions.record_checks,
		"starting grove-server"
	);

	if config.database.is_in_memory() {
		tracing::warn!("database is in memory, nothing will outlive this process");
	}

	let pool = create_pool(&config.database.url).await?;
	run_migrations(&pool).await?;

	match args.command.unwrap_or(Command::Migrate) {
		Command::Migrate => {
			tracing::info!("migrations applied");
		}
		Command::Roles { user_id } => {
			let users = UserRepository::new(pool);
			let report = report::role_report(&users, &UserId::new(user_id)).await?;
			println!("{}", serde_json::to_string_pretty(&report)?);
		}
	}

	Ok(())
}
