// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store traits consumed by the identity variants.
//!
//! The permission core never talks to a database directly. It asks a
//! [`PermissionStore`] for a user's effective roles and a [`ParentStore`] for the
//! containing scope of an object. `grove-server-db` provides SQLite
//! implementations of both.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::error::StoreError;
use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, GlobalRole, NotificationId,
	OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId, UploadId, UserId,
};

pub type OrganizationRoles = HashMap<OrganizationId, Role>;
pub type ProjectRoles = HashMap<ProjectId, Role>;
pub type SiteRoles = HashMap<SiteId, Role>;
pub type FacilityRoles = HashMap<FacilityId, Role>;
pub type GlobalRoles = HashSet<GlobalRole>;

/// Resolves a user's effective role at every level of the hierarchy.
///
/// Implementations never deny: a scope the user cannot reach is simply absent
/// from the returned map. The only failure is the store's own.
#[async_trait]
pub trait PermissionStore: Send + Sync {
	async fn fetch_organization_roles(&self, user_id: &UserId)
		-> Result<OrganizationRoles, StoreError>;
	async fn fetch_project_roles(&self, user_id: &UserId) -> Result<ProjectRoles, StoreError>;
	async fn fetch_site_roles(&self, user_id: &UserId) -> Result<SiteRoles, StoreError>;
	async fn fetch_facility_roles(&self, user_id: &UserId) -> Result<FacilityRoles, StoreError>;
	async fn fetch_global_roles(&self, user_id: &UserId) -> Result<GlobalRoles, StoreError>;
}

/// Looks up the containing scope of an object.
///
/// `None` means the object does not exist, which capability checks treat as a
/// denial.
#[async_trait]
pub trait ParentStore: Send + Sync {
	async fn site_of_facility(&self, facility_id: &FacilityId) -> Result<Option<SiteId>, StoreError>;
	async fn organization_of_facility(
		&self,
		facility_id: &FacilityId,
	) -> Result<Option<OrganizationId>, StoreError>;
	async fn facility_of_accession(
		&self,
		accession_id: &AccessionId,
	) -> Result<Option<FacilityId>, StoreError>;
	async fn facility_of_automation(
		&self,
		automation_id: &AutomationId,
	) -> Result<Option<FacilityId>, StoreError>;
	async fn facility_of_device(&self, device_id: &DeviceId) -> Result<Option<FacilityId>, StoreError>;
	async fn facility_of_device_manager(
		&self,
		device_manager_id: &DeviceManagerId,
	) -> Result<Option<FacilityId>, StoreError>;
	async fn facility_of_storage_location(
		&self,
		storage_location_id: &StorageLocationId,
	) -> Result<Option<FacilityId>, StoreError>;
	async fn organization_of_species(
		&self,
		species_id: &SpeciesId,
	) -> Result<Option<OrganizationId>, StoreError>;
	async fn user_of_notification(
		&self,
		notification_id: &NotificationId,
	) -> Result<Option<UserId>, StoreError>;
	async fn user_of_upload(&self, upload_id: &UploadId) -> Result<Option<UserId>, StoreError>;
	async fn device_manager_of_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<DeviceManagerId>, StoreError>;
}
