// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Containment lookups: which scope owns a given object.

use async_trait::async_trait;
use grove_server_auth::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, NotificationId,
	OrganizationId, ParentStore, SiteId, SpeciesId, StorageLocationId, StoreError, UploadId,
	UserId,
};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;
use crate::parse::parse_id;

#[derive(Clone)]
pub struct ParentRepository {
	pool: SqlitePool,
}

impl ParentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Run a single-column ID query. A missing row means the object does not exist.
	async fn lookup<T: From<Uuid>>(
		&self,
		sql: &str,
		id: impl ToString,
		column: &str,
	) -> Result<Option<T>, DbError> {
		let row: Option<(Option<String>,)> = sqlx::query_as(sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some((Some(value),)) => Ok(Some(parse_id(&value, column)?)),
			_ => Ok(None),
		}
	}

	#[tracing::instrument(skip(self), fields(facility_id = %facility_id))]
	pub async fn site_of_facility(&self, facility_id: &FacilityId) -> Result<Option<SiteId>, DbError> {
		self.lookup("SELECT site_id FROM facilities WHERE id = ?", facility_id, "site_id")
			.await
	}

	#[tracing::instrument(skip(self), fields(facility_id = %facility_id))]
	pub async fn organization_of_facility(
		&self,
		facility_id: &FacilityId,
	) -> Result<Option<OrganizationId>, DbError> {
		self.lookup(
			r#"
			SELECT p.organization_id
			FROM facilities f
			JOIN sites s ON s.id = f.site_id
			JOIN projects p ON p.id = s.project_id
			WHERE f.id = ?
			"#,
			facility_id,
			"organization_id",
		)
		.await
	}

	pub async fn facility_of_accession(
		&self,
		accession_id: &AccessionId,
	) -> Result<Option<FacilityId>, DbError> {
		self.lookup(
			"SELECT facility_id FROM accessions WHERE id = ?",
			accession_id,
			"facility_id",
		)
		.await
	}

	pub async fn facility_of_automation(
		&self,
		automation_id: &AutomationId,
	) -> Result<Option<FacilityId>, DbError> {
		self.lookup(
			"SELECT facility_id FROM automations WHERE id = ?",
			automation_id,
			"facility_id",
		)
		.await
	}

	pub async fn facility_of_device(&self, device_id: &DeviceId) -> Result<Option<FacilityId>, DbError> {
		self.lookup("SELECT facility_id FROM devices WHERE id = ?", device_id, "facility_id")
			.await
	}

	pub async fn facility_of_device_manager(
		&self,
		device_manager_id: &DeviceManagerId,
	) -> Result<Option<FacilityId>, DbError> {
		self.lookup(
			"SELECT facility_id FROM device_managers WHERE id = ?",
			device_manager_id,
			"facility_id",
		)
		.await
	}

	pub async fn facility_of_storage_location(
		&self,
		storage_location_id: &StorageLocationId,
	) -> Result<Option<FacilityId>, DbError> {
		self.lookup(
			"SELECT facility_id FROM storage_locations WHERE id = ?",
			storage_location_id,
			"facility_id",
		)
		.await
	}

	pub async fn organization_of_species(
		&self,
		species_id: &SpeciesId,
	) -> Result<Option<OrganizationId>, DbError> {
		self.lookup(
			"SELECT organization_id FROM species WHERE id = ?",
			species_id,
			"organization_id",
		)
		.await
	}

	pub async fn user_of_notification(
		&self,
		notification_id: &NotificationId,
	) -> Result<Option<UserId>, DbError> {
		self.lookup(
			"SELECT user_id FROM notifications WHERE id = ?",
			notification_id,
			"user_id",
		)
		.await
	}

	pub async fn user_of_upload(&self, upload_id: &UploadId) -> Result<Option<UserId>, DbError> {
		self.lookup("SELECT created_by FROM uploads WHERE id = ?", upload_id, "created_by")
			.await
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn device_manager_of_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<DeviceManagerId>, DbError> {
		self.lookup("SELECT id FROM device_managers WHERE user_id = ?", user_id, "id")
			.await
	}
}

#[async_trait]
impl ParentStore for ParentRepository {
	async fn site_of_facility(&self, facility_id: &FacilityId) -> Result<Option<SiteId>, StoreError> {
		Ok(self.site_of_facility(facility_id).await?)
	}

	async fn organization_of_facility(
		&self,
		facility_id: &FacilityId,
	) -> Result<Option<OrganizationId>, StoreError> {
		Ok(self.organization_of_facility(facility_id).await?)
	}

	async fn facility_of_accession(
		&self,
		accession_id: &AccessionId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(self.facility_of_accession(accession_id).await?)
	}

	async fn facility_of_automation(
		&self,
		automation_id: &AutomationId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(self.facility_of_automation(automation_id).await?)
	}

	async fn facility_of_device(&self, device_id: &DeviceId) -> Result<Option<FacilityId>, StoreError> {
		Ok(self.facility_of_device(device_id).await?)
	}

	async fn facility_of_device_manager(
		&self,
		device_manager_id: &DeviceManagerId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(self.facility_of_device_manager(device_manager_id).await?)
	}

	async fn facility_of_storage_location(
		&self,
		storage_location_id: &StorageLocationId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(self.facility_of_storage_location(storage_location_id).await?)
	}

	async fn organization_of_species(
		&self,
		species_id: &SpeciesId,
	) -> Result<Option<OrganizationId>, StoreError> {
		Ok(self.organization_of_species(species_id).await?)
	}

	async fn user_of_notification(
		&self,
		notification_id: &NotificationId,
	) -> Result<Option<UserId>, StoreError> {
		Ok(self.user_of_notification(notification_id).await?)
	}

	async fn user_of_upload(&self, upload_id: &UploadId) -> Result<Option<UserId>, StoreError> {
		Ok(self.user_of_upload(upload_id).await?)
	}

	async fn device_manager_of_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<DeviceManagerId>, StoreError> {
		Ok(self.device_manager_of_user(user_id).await?)
	}
}
