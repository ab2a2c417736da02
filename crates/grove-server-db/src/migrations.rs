// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded schema migrations.
//!
//! Every statement is idempotent (`IF NOT EXISTS`), so running the full list
//! against an up-to-date database is a no-op.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[(
	"001_permission_schema",
	include_str!("../migrations/001_permission_schema.sql"),
)];

/// Apply all embedded migrations in order.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for statement in sql.split(';').map(str::trim).filter(|s| !is_blank(s)) {
			if let Err(e) = sqlx::query(statement).execute(pool).await {
				if e.to_string().contains("already exists") {
					continue;
				}
				return Err(e.into());
			}
		}
		tracing::debug!(migration = %name, "migration applied");
	}
	Ok(())
}

/// True for fragments that contain only whitespace and `--` comments.
fn is_blank(statement: &str) -> bool {
	statement
		.lines()
		.map(str::trim)
		.all(|line| line.is_empty() || line.starts_with("--"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;

	#[tokio::test]
	async fn migrations_are_idempotent() {
		let pool = create_test_pool().await;
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let (count,): (i64,) = sqlx::query_as(
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'organization_users'",
		)
		.fetch_one(&pool)
		.await
		.unwrap();
		assert_eq!(count, 1);
	}

	#[test]
	fn comment_only_fragments_are_blank() {
		assert!(is_blank("  \n-- trailing comment\n"));
		assert!(!is_blank("-- users\nCREATE TABLE users (id TEXT)"));
	}
}
