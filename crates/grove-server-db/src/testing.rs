// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use grove_server_auth::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, GlobalRole, NotificationId,
	OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId, UploadId, UserId,
	UserType,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::migrations::run_migrations;

/// Single-connection in-memory pool; every connection to `:memory:` is its own
/// database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.unwrap()
}

pub async fn create_permission_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn insert_user(pool: &SqlitePool, user_type: UserType) -> UserId {
	let id = UserId::generate();
	let now = Utc::now().to_rfc3339();
	sqlx::query(
		r#"
		INSERT INTO users (id, auth_id, email, first_name, last_name, user_type, created_at, updated_at)
		VALUES (?, ?, ?, 'Test', 'User', ?, ?, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(format!("auth|{id}"))
	.bind(format!("{id}@example.com"))
	.bind(user_type.to_string())
	.bind(&now)
	.bind(&now)
	.execute(pool)
	.await
	.unwrap();
	id
}

pub async fn insert_organization(pool: &SqlitePool) -> OrganizationId {
	let id = OrganizationId::generate();
	sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES (?, 'Org', ?)")
		.bind(id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn add_member(pool: &SqlitePool, organization_id: OrganizationId, user_id: UserId, role: &str) {
	sqlx::query(
		"INSERT INTO organization_users (organization_id, user_id, role, created_at) VALUES (?, ?, ?, ?)",
	)
	.bind(organization_id.to_string())
	.bind(user_id.to_string())
	.bind(role)
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
}

pub async fn add_member_with_role(
	pool: &SqlitePool,
	organization_id: OrganizationId,
	user_id: UserId,
	role: Role,
) {
	add_member(pool, organization_id, user_id, &role.to_string()).await;
}

pub async fn insert_project(
	pool: &SqlitePool,
	organization_id: OrganizationId,
	organization_wide: bool,
) -> ProjectId {
	let id = ProjectId::generate();
	sqlx::query("INSERT INTO projects (id, organization_id, name, organization_wide) VALUES (?, ?, 'Project', ?)")
		.bind(id.to_string())
		.bind(organization_id.to_string())
		.bind(organization_wide)
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn add_project_user(pool: &SqlitePool, project_id: ProjectId, user_id: UserId) {
	sqlx::query("INSERT INTO project_users (project_id, user_id) VALUES (?, ?)")
		.bind(project_id.to_string())
		.bind(user_id.to_string())
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_site(pool: &SqlitePool, project_id: ProjectId) -> SiteId {
	let id = SiteId::generate();
	sqlx::query("INSERT INTO sites (id, project_id, name) VALUES (?, ?, 'Site')")
		.bind(id.to_string())
		.bind(project_id.to_string())
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_facility(pool: &SqlitePool, site_id: SiteId) -> FacilityId {
	let id = FacilityId::generate();
	sqlx::query("INSERT INTO facilities (id, site_id, name) VALUES (?, ?, 'Facility')")
		.bind(id.to_string())
		.bind(site_id.to_string())
		.execute(pool)
		.await
		.unwrap();
	id
}

async fn insert_facility_child(pool: &SqlitePool, table: &str, id: String, facility_id: FacilityId) {
	let sql = if table == "accessions" {
		format!("INSERT INTO {table} (id, facility_id) VALUES (?, ?)")
	} else {
		format!("INSERT INTO {table} (id, facility_id, name) VALUES (?, ?, 'Child')")
	};
	sqlx::query(&sql)
		.bind(id)
		.bind(facility_id.to_string())
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_accession(pool: &SqlitePool, facility_id: FacilityId) -> AccessionId {
	let id = AccessionId::generate();
	insert_facility_child(pool, "accessions", id.to_string(), facility_id).await;
	id
}

pub async fn insert_automation(pool: &SqlitePool, facility_id: FacilityId) -> AutomationId {
	let id = AutomationId::generate();
	insert_facility_child(pool, "automations", id.to_string(), facility_id).await;
	id
}

pub async fn insert_device(pool: &SqlitePool, facility_id: FacilityId) -> DeviceId {
	let id = DeviceId::generate();
	insert_facility_child(pool, "devices", id.to_string(), facility_id).await;
	id
}

pub async fn insert_storage_location(pool: &SqlitePool, facility_id: FacilityId) -> StorageLocationId {
	let id = StorageLocationId::generate();
	insert_facility_child(pool, "storage_locations", id.to_string(), facility_id).await;
	id
}

pub async fn insert_device_manager(
	pool: &SqlitePool,
	facility_id: FacilityId,
	user_id: Option<UserId>,
) -> DeviceManagerId {
	let id = DeviceManagerId::generate();
	sqlx::query("INSERT INTO device_managers (id, facility_id, user_id) VALUES (?, ?, ?)")
		.bind(id.to_string())
		.bind(facility_id.to_string())
		.bind(user_id.map(|u| u.to_string()))
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_species(pool: &SqlitePool, organization_id: OrganizationId) -> SpeciesId {
	let id = SpeciesId::generate();
	sqlx::query("INSERT INTO species (id, organization_id, scientific_name) VALUES (?, ?, 'Acacia')")
		.bind(id.to_string())
		.bind(organization_id.to_string())
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_notification(pool: &SqlitePool, user_id: UserId) -> NotificationId {
	let id = NotificationId::generate();
	sqlx::query("INSERT INTO notifications (id, user_id, created_at) VALUES (?, ?, ?)")
		.bind(id.to_string())
		.bind(user_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_upload(pool: &SqlitePool, user_id: UserId) -> UploadId {
	let id = UploadId::generate();
	sqlx::query("INSERT INTO uploads (id, created_by, created_at) VALUES (?, ?, ?)")
		.bind(id.to_string())
		.bind(user_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn grant_global_role(pool: &SqlitePool, user_id: UserId, role: GlobalRole) {
	sqlx::query("INSERT INTO user_global_roles (user_id, global_role) VALUES (?, ?)")
		.bind(user_id.to_string())
		.bind(role.to_string())
		.execute(pool)
		.await
		.unwrap();
}
