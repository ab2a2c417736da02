// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading user identities.
//!
//! A row in `users` becomes one of the identity variants according to its
//! `user_type`. Users authenticated by the identity provider are registered the
//! first time they are seen.

use chrono::Utc;
use grove_server_auth::{
	DeviceManagerBinding, DeviceManagerUser, FunderUser, IdentityProvider, IndividualUser,
	ParentStore, PermissionStore, ProviderProfile, SystemUser, UserId, UserIdentity, UserProfile,
	UserType,
};
use sqlx::{
	sqlite::{SqlitePool, SqliteRow},
	Row,
};
use std::sync::Arc;

use crate::error::DbError;
use crate::parent::ParentRepository;
use crate::parse::{parse_enum, parse_id};
use crate::permission::PermissionRepository;

const SYSTEM_AUTH_ID: &str = "system";

const USER_COLUMNS: &str =
	"id, auth_id, email, first_name, last_name, user_type, funding_entity_id";

/// Repository for loading and registering users.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
	permissions: Arc<PermissionRepository>,
	parents: Arc<ParentRepository>,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			permissions: Arc::new(PermissionRepository::new(pool.clone())),
			parents: Arc::new(ParentRepository::new(pool.clone())),
			pool,
		}
	}

	fn permission_store(&self) -> Arc<dyn PermissionStore> {
		self.permissions.clone()
	}

	fn parent_store(&self) -> Arc<dyn ParentStore> {
		self.parents.clone()
	}

	// =========================================================================
	// Lookup
	// =========================================================================

	/// Load a user by ID, building the identity variant for its type.
	///
	/// # Errors
	/// Returns `DbError::Internal` for unparseable columns or a device-manager
	/// user with no bound device manager.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn fetch_by_id(&self, user_id: &UserId) -> Result<Option<Arc<dyn UserIdentity>>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(user_id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => Ok(Some(self.identity_from_row(&row).await?)),
			None => Ok(None),
		}
	}

	/// Load a user by identity-provider subject, registering them on first sight.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if neither the database nor the provider knows
	/// the subject, and `DbError::Provider` if the provider lookup fails.
	#[tracing::instrument(skip(self, provider), fields(auth_id = %auth_id))]
	pub async fn fetch_by_auth_id(
		&self,
		auth_id: &str,
		provider: &dyn IdentityProvider,
	) -> Result<Arc<dyn UserIdentity>, DbError> {
		if let Some(identity) = self.find_by_auth_id(auth_id).await? {
			return Ok(identity);
		}

		let profile = provider
			.fetch_profile(auth_id)
			.await
			.map_err(DbError::Provider)?
			.ok_or_else(|| DbError::NotFound(format!("No user with auth ID {auth_id}")))?;

		match self.create_user(&profile, UserType::Individual).await {
			Ok(user_id) => {
				tracing::debug!(user_id = %user_id, auth_id = %auth_id, "registered user on first sign-in");
			}
			// Another request registered the same subject first.
			Err(DbError::Conflict(_)) => {
				tracing::debug!(auth_id = %auth_id, "user registered concurrently");
			}
			Err(e) => return Err(e),
		}

		self.find_by_auth_id(auth_id)
			.await?
			.ok_or_else(|| DbError::Internal(format!("User {auth_id} missing after insert")))
	}

	async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<Arc<dyn UserIdentity>>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE auth_id = ?"))
			.bind(auth_id)
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => Ok(Some(self.identity_from_row(&row).await?)),
			None => Ok(None),
		}
	}

	async fn identity_from_row(&self, row: &SqliteRow) -> Result<Arc<dyn UserIdentity>, DbError> {
		let user_id: UserId = parse_id(&row.get::<String, _>("id"), "user_id")?;
		let user_type: UserType = parse_enum(&row.get::<String, _>("user_type"), "user_type")?;
		let auth_id: Option<String> = row.get("auth_id");
		let email: String = row.get("email");
		let first_name: Option<String> = row.get("first_name");
		let last_name: Option<String> = row.get("last_name");

		let identity: Arc<dyn UserIdentity> = match user_type {
			UserType::Individual | UserType::ApiClient => Arc::new(IndividualUser::new(
				UserProfile {
					user_id,
					auth_id,
					email,
					first_name,
					last_name,
					user_type,
				},
				self.permission_store(),
				self.parent_store(),
			)),
			UserType::DeviceManager => {
				let binding = self.device_manager_binding(&user_id).await?;
				Arc::new(DeviceManagerUser::new(
					user_id,
					auth_id,
					binding,
					self.permission_store(),
					self.parent_store(),
				))
			}
			UserType::Funder => {
				let funding_entity_id = row
					.get::<Option<String>, _>("funding_entity_id")
					.map(|id| parse_id(&id, "funding_entity_id"))
					.transpose()?;
				Arc::new(
					FunderUser::new(user_id, auth_id, email, funding_entity_id, self.parent_store())
						.with_name(first_name, last_name),
				)
			}
			UserType::System => Arc::new(SystemUser::new(user_id)),
		};

		Ok(identity)
	}

	/// Resolve the device manager a device-manager user is bound to, along with
	/// its facility, site and organization.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn device_manager_binding(&self, user_id: &UserId) -> Result<DeviceManagerBinding, DbError> {
		DeviceManagerBinding::resolve(self.parents.as_ref(), user_id)
			.await
			.map_err(DbError::Store)?
			.ok_or_else(|| DbError::Internal(format!("Device manager user {user_id} has no device manager")))
	}

	// =========================================================================
	// Registration
	// =========================================================================

	/// Insert a user from provider profile fields.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a user with the same auth ID exists.
	#[tracing::instrument(skip(self, profile), fields(auth_id = %profile.auth_id, user_type = %user_type))]
	pub async fn create_user(&self, profile: &ProviderProfile, user_type: UserType) -> Result<UserId, DbError> {
		let user_id = UserId::generate();
		let now = Utc::now().to_rfc3339();

		let result = sqlx::query(
			r#"
			INSERT INTO users (id, auth_id, email, first_name, last_name, user_type, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user_id.to_string())
		.bind(&profile.auth_id)
		.bind(&profile.email)
		.bind(&profile.first_name)
		.bind(&profile.last_name)
		.bind(user_type.to_string())
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => Ok(user_id),
			Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::Conflict(format!(
				"User with auth ID {} already exists",
				profile.auth_id
			))),
			Err(e) => Err(e.into()),
		}
	}

	/// The system identity, backed by a `users` row that is created if absent.
	#[tracing::instrument(skip(self))]
	pub async fn system_user(&self) -> Result<SystemUser, DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			INSERT INTO users (id, auth_id, email, user_type, created_at, updated_at)
			VALUES (?, ?, ?, 'system', ?, ?)
			ON CONFLICT(auth_id) DO NOTHING
			"#,
		)
		.bind(UserId::generate().to_string())
		.bind(SYSTEM_AUTH_ID)
		.bind(SYSTEM_AUTH_ID)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		let (id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE auth_id = ?")
			.bind(SYSTEM_AUTH_ID)
			.fetch_one(&self.pool)
			.await?;

		Ok(SystemUser::new(parse_id(&id, "user_id")?))
	}
}
