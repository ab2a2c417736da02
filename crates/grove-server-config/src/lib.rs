// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Grove server.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Consistent environment variable naming (`GROVE_SERVER_*`)
//! - Tracing subscriber setup from the logging section
//!
//! # Usage
//!
//! ```ignore
//! use grove_server_config::{init_tracing, load_config};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub permissions: PermissionsConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`GROVE_SERVER_*`)
/// 2. Config file (`/etc/grove/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let permissions = layer.permissions.unwrap_or_default().finalize();

	validate_config(&database)?;

	info!(
		database = %database.url,
		log_level = %logging.level,
		log_format = %logging.format,
		record_checks = permissions.record_checks,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		logging,
		permissions,
	})
}

fn validate_config(database: &DatabaseConfig) -> Result<(), ConfigError> {
	database.validate()
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured
/// level.
pub fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json())
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer())
				.init();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	struct FixedSource {
		precedence: Precedence,
		layer: ServerConfigLayer,
	}

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
			Ok(self.layer.clone())
		}
	}

	fn url_layer(url: &str) -> ServerConfigLayer {
		ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some(url.to_string()),
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.database.url, "sqlite:./grove.db");
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.logging.format, LogFormat::Pretty);
		assert!(!config.permissions.record_checks);
	}

	#[test]
	fn test_non_sqlite_url_is_rejected() {
		let result = finalize(url_layer("postgres://localhost/grove"));
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource {
				precedence: Precedence::Environment,
				layer: url_layer("sqlite:env.db"),
			}),
			Box::new(FixedSource {
				precedence: Precedence::ConfigFile,
				layer: url_layer("sqlite:file.db"),
			}),
		])
		.unwrap();
		assert_eq!(config.database.url, "sqlite:env.db");
	}

	proptest! {
		#[test]
		fn later_layers_override_earlier(
			first in "[a-z]{1,8}",
			second in proptest::option::of("[a-z]{1,8}"),
		) {
			let mut merged = ServerConfigLayer::default();
			merged.merge(url_layer(&format!("sqlite:{first}.db")));
			merged.merge(match &second {
				Some(s) => url_layer(&format!("sqlite:{s}.db")),
				None => ServerConfigLayer::default(),
			});
			let expected = format!("sqlite:{}.db", second.as_ref().unwrap_or(&first));
			prop_assert_eq!(finalize(merged).unwrap().database.url, expected);
		}
	}
}
