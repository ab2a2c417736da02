// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where role assignments and the containment hierarchy are stored.
//!
//! Only SQLite is supported. The URL is handed to `grove_server_db::create_pool`
//! unchanged, so `sqlite::memory:` and `sqlite:/path/to/file.db` both work.

use serde::Deserialize;

use crate::error::ConfigError;

const SQLITE_SCHEME: &str = "sqlite:";
const DEFAULT_URL: &str = "sqlite:./grove.db";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
}

impl DatabaseConfig {
	/// Reject URLs the SQLite pool cannot open.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.url.starts_with(SQLITE_SCHEME) {
			return Err(ConfigError::Validation(format!(
				"GROVE_SERVER_DATABASE_URL must be a {SQLITE_SCHEME} URL, got '{}'",
				self.url
			)));
		}
		Ok(())
	}

	pub fn is_in_memory(&self) -> bool {
		self.url.contains(":memory:")
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

/// `[database]` table, or `GROVE_SERVER_DATABASE_URL`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
		}
	}
}
