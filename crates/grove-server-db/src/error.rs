// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use grove_server_auth::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Identity provider error: {0}")]
	Provider(#[source] StoreError),

	#[error("Store error: {0}")]
	Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
	fn from(e: DbError) -> Self {
		StoreError::new(e)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn converts_into_store_error_with_message() {
		let store_error: StoreError = DbError::Internal("Invalid role: boss".to_string()).into();
		assert_eq!(store_error.to_string(), "Internal: Invalid role: boss");
	}
}
