// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role resolution backed by SQLite.
//!
//! Every scope below an organization inherits the user's organization role. A
//! project is visible to a member when any of the following is true:
//! - the member is an admin or higher in the organization
//! - the member was added to the project
//! - the project is organization-wide
//! - the user is an API client
//!
//! Sites and facilities are visible when their project is.

use async_trait::async_trait;
use grove_server_auth::{
	FacilityRoles, GlobalRoles, OrganizationRoles, PermissionStore, ProjectRoles, Role, SiteRoles,
	StoreError, UserId,
};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;
use crate::parse::{parse_enum, parse_id};

/// Projects visible to the bound user, paired with the user's organization role.
macro_rules! visible_projects_cte {
	() => {
		r#"
		WITH visible_projects AS (
			SELECT p.id AS project_id, ou.role AS role
			FROM projects p
			JOIN organization_users ou ON ou.organization_id = p.organization_id
			JOIN users u ON u.id = ou.user_id
			WHERE ou.user_id = ?
				AND (
					ou.role IN ('admin', 'owner', 'terraformation_contact')
					OR p.organization_wide = 1
					OR u.user_type = 'api_client'
					OR EXISTS (
						SELECT 1 FROM project_users pu
						WHERE pu.project_id = p.id AND pu.user_id = ou.user_id
					)
				)
		)
		"#
	};
}

const PROJECT_ROLES_SQL: &str = concat!(
	visible_projects_cte!(),
	"SELECT project_id, role FROM visible_projects"
);

const SITE_ROLES_SQL: &str = concat!(
	visible_projects_cte!(),
	r#"
	SELECT s.id, vp.role
	FROM sites s
	JOIN visible_projects vp ON vp.project_id = s.project_id
	"#
);

const FACILITY_ROLES_SQL: &str = concat!(
	visible_projects_cte!(),
	r#"
	SELECT f.id, vp.role
	FROM facilities f
	JOIN sites s ON s.id = f.site_id
	JOIN visible_projects vp ON vp.project_id = s.project_id
	"#
);

/// Repository answering "what role does this user hold where".
#[derive(Clone)]
pub struct PermissionRepository {
	pool: SqlitePool,
}

impl PermissionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Run a two-column `(id, role)` query bound to a single user ID.
	async fn fetch_role_rows<K>(&self, sql: &str, user_id: &UserId) -> Result<Vec<(K, Role)>, DbError>
	where
		K: From<Uuid>,
	{
		let rows: Vec<(String, String)> = sqlx::query_as(sql)
			.bind(user_id.to_string())
			.fetch_all(&self.pool)
			.await?;

		rows.iter()
			.map(|(id, role)| Ok((parse_id(id, "id")?, parse_enum(role, "role")?)))
			.collect()
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn organization_roles(&self, user_id: &UserId) -> Result<OrganizationRoles, DbError> {
		let roles: OrganizationRoles = self
			.fetch_role_rows(
				r#"
				SELECT organization_id, role
				FROM organization_users
				WHERE user_id = ?
				"#,
				user_id,
			)
			.await?
			.into_iter()
			.collect();

		tracing::debug!(user_id = %user_id, count = roles.len(), "resolved organization roles");
		Ok(roles)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn project_roles(&self, user_id: &UserId) -> Result<ProjectRoles, DbError> {
		let roles: ProjectRoles = self
			.fetch_role_rows(PROJECT_ROLES_SQL, user_id)
			.await?
			.into_iter()
			.collect();

		tracing::debug!(user_id = %user_id, count = roles.len(), "resolved project roles");
		Ok(roles)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn site_roles(&self, user_id: &UserId) -> Result<SiteRoles, DbError> {
		let roles: SiteRoles = self
			.fetch_role_rows(SITE_ROLES_SQL, user_id)
			.await?
			.into_iter()
			.collect();

		tracing::debug!(user_id = %user_id, count = roles.len(), "resolved site roles");
		Ok(roles)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn facility_roles(&self, user_id: &UserId) -> Result<FacilityRoles, DbError> {
		let roles: FacilityRoles = self
			.fetch_role_rows(FACILITY_ROLES_SQL, user_id)
			.await?
			.into_iter()
			.collect();

		tracing::debug!(user_id = %user_id, count = roles.len(), "resolved facility roles");
		Ok(roles)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn global_roles(&self, user_id: &UserId) -> Result<GlobalRoles, DbError> {
		let rows: Vec<(String,)> = sqlx::query_as(
			r#"
			SELECT global_role
			FROM user_global_roles
			WHERE user_id = ?
			"#,
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|(role,)| parse_enum(role, "global_role"))
			.collect()
	}
}

#[async_trait]
impl PermissionStore for PermissionRepository {
	async fn fetch_organization_roles(
		&self,
		user_id: &UserId,
	) -> Result<OrganizationRoles, StoreError> {
		Ok(self.organization_roles(user_id).await?)
	}

	async fn fetch_project_roles(&self, user_id: &UserId) -> Result<ProjectRoles, StoreError> {
		Ok(self.project_roles(user_id).await?)
	}

	async fn fetch_site_roles(&self, user_id: &UserId) -> Result<SiteRoles, StoreError> {
		Ok(self.site_roles(user_id).await?)
	}

	async fn fetch_facility_roles(&self, user_id: &UserId) -> Result<FacilityRoles, StoreError> {
		Ok(self.facility_roles(user_id).await?)
	}

	async fn fetch_global_roles(&self, user_id: &UserId) -> Result<GlobalRoles, StoreError> {
		Ok(self.global_roles(user_id).await?)
	}
}
