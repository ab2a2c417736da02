// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordinary users and API clients.
//!
//! Capabilities are decided from the user's role maps. Roles are currently
//! assigned per organization, so the project, site and facility maps carry the
//! organization role of every scope the user can reach.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::cache::RoleCache;
use super::{make_full_name, UserIdentity};
use crate::check::{CheckKind, TargetId};
use crate::context::lock;
use crate::error::IdentityError;
use crate::recorder::CheckRecorder;
use crate::store::{
	FacilityRoles, GlobalRoles, OrganizationRoles, ParentStore, PermissionStore, ProjectRoles,
	SiteRoles,
};
use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, FundingEntityId, GlobalRole,
	NotificationId, OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId,
	UploadId, UserId, UserType,
};

type Check = Result<bool, IdentityError>;

/// Stored details of a person or API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	pub user_id: UserId,
	pub auth_id: Option<String>,
	pub email: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub user_type: UserType,
}

impl UserProfile {
	pub fn full_name(&self) -> Option<String> {
		make_full_name(self.first_name.as_deref(), self.last_name.as_deref())
	}
}

pub struct IndividualUser {
	profile: UserProfile,
	roles: RoleCache,
	permissions: Arc<dyn PermissionStore>,
	parents: Arc<dyn ParentStore>,
	/// Scoped to the request that owns this identity.
	recorder: Mutex<Option<Arc<CheckRecorder>>>,
}

impl IndividualUser {
	pub fn new(
		profile: UserProfile,
		permissions: Arc<dyn PermissionStore>,
		parents: Arc<dyn ParentStore>,
	) -> Self {
		Self {
			roles: RoleCache::new(profile.user_id, Arc::clone(&permissions)),
			profile,
			permissions,
			parents,
			recorder: Mutex::new(None),
		}
	}

	pub fn profile(&self) -> &UserProfile {
		&self.profile
	}

	pub fn email(&self) -> &str {
		&self.profile.email
	}

	pub fn full_name(&self) -> Option<String> {
		self.profile.full_name()
	}

	/// The cached role maps, for callers that need to invalidate a single map.
	pub fn role_cache(&self) -> &RoleCache {
		&self.roles
	}

	// =========================================================================
	// Role comparisons
	// =========================================================================

	fn record(&self, kind: CheckKind, granted: bool) {
		let recorder = lock(&self.recorder).clone();
		if let Some(recorder) = recorder {
			recorder.record(kind, granted);
		}
	}

	fn has_role<K>(&self, roles: &HashMap<K, Role>, id: &K, required: Role) -> bool
	where
		K: Copy + Eq + Hash + Into<TargetId>,
	{
		let granted = roles
			.get(id)
			.is_some_and(|role| role.has_permission_of(required));
		self.record(
			CheckKind::Role {
				role: required,
				target: (*id).into(),
			},
			granted,
		);
		granted
	}

	async fn organization_role(&self, id: &OrganizationId, required: Role) -> Check {
		let roles = self.roles.organization_roles().await?;
		Ok(self.has_role(&*roles, id, required))
	}

	async fn project_role(&self, id: &ProjectId, required: Role) -> Check {
		let roles = self.roles.project_roles().await?;
		Ok(self.has_role(&*roles, id, required))
	}

	async fn site_role(&self, id: &SiteId, required: Role) -> Check {
		let roles = self.roles.site_roles().await?;
		Ok(self.has_role(&*roles, id, required))
	}

	async fn facility_role(&self, id: &FacilityId, required: Role) -> Check {
		let roles = self.roles.facility_roles().await?;
		Ok(self.has_role(&*roles, id, required))
	}

	/// Role check against the facility an object belongs to. A missing object
	/// is a denial and records nothing.
	async fn parent_facility_role(&self, parent: Option<FacilityId>, required: Role) -> Check {
		match parent {
			Some(facility_id) => self.facility_role(&facility_id, required).await,
			None => Ok(false),
		}
	}

	async fn has_global_role(&self, required: GlobalRole) -> Check {
		let roles = self.roles.global_roles().await?;
		let granted = roles.iter().any(|role| role.has_permission_of(required));
		self.record(CheckKind::GlobalRole { role: required }, granted);
		Ok(granted)
	}

	fn is_self(&self, user_id: Option<UserId>) -> bool {
		user_id == Some(self.profile.user_id)
	}
}

#[async_trait]
impl UserIdentity for IndividualUser {
	fn user_id(&self) -> UserId {
		self.profile.user_id
	}

	fn user_type(&self) -> UserType {
		self.profile.user_type
	}

	fn auth_id(&self) -> Option<&str> {
		self.profile.auth_id.as_deref()
	}

	fn username(&self) -> String {
		self.profile.email.clone()
	}

	fn default_permission(&self) -> bool {
		false
	}

	async fn organization_roles(&self) -> Result<Arc<OrganizationRoles>, IdentityError> {
		Ok(self.roles.organization_roles().await?)
	}

	async fn project_roles(&self) -> Result<Arc<ProjectRoles>, IdentityError> {
		Ok(self.roles.project_roles().await?)
	}

	async fn site_roles(&self) -> Result<Arc<SiteRoles>, IdentityError> {
		Ok(self.roles.site_roles().await?)
	}

	async fn facility_roles(&self) -> Result<Arc<FacilityRoles>, IdentityError> {
		Ok(self.roles.facility_roles().await?)
	}

	async fn global_roles(&self) -> Result<Arc<GlobalRoles>, IdentityError> {
		Ok(self.roles.global_roles().await?)
	}

	async fn clear_cached_permissions(&self) {
		self.roles.clear().await;
	}

	fn attach_recorder(&self, recorder: Option<Arc<CheckRecorder>>) -> Option<Arc<CheckRecorder>> {
		std::mem::replace(&mut *lock(&self.recorder), recorder)
	}

	// Accessions

	async fn can_create_accession(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_read_accession(&self, accession_id: &AccessionId) -> Check {
		let facility = self.parents.facility_of_accession(accession_id).await?;
		self.parent_facility_role(facility, Role::Contributor).await
	}

	async fn can_update_accession(&self, accession_id: &AccessionId) -> Check {
		self.can_read_accession(accession_id).await
	}

	// Automations: anyone with access to the facility has full control.

	async fn can_create_automation(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_list_automations(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_read_automation(&self, automation_id: &AutomationId) -> Check {
		let facility = self.parents.facility_of_automation(automation_id).await?;
		self.parent_facility_role(facility, Role::Contributor).await
	}

	async fn can_update_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_read_automation(automation_id).await
	}

	async fn can_delete_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_read_automation(automation_id).await
	}

	async fn can_trigger_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_read_automation(automation_id).await
	}

	// Devices

	async fn can_create_device(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_read_device(&self, device_id: &DeviceId) -> Check {
		let facility = self.parents.facility_of_device(device_id).await?;
		self.parent_facility_role(facility, Role::Contributor).await
	}

	async fn can_update_device(&self, device_id: &DeviceId) -> Check {
		self.can_read_device(device_id).await
	}

	async fn can_create_device_manager(&self) -> Check {
		self.has_global_role(GlobalRole::SuperAdmin).await
	}

	async fn can_read_device_manager(&self, device_manager_id: &DeviceManagerId) -> Check {
		let facility = self
			.parents
			.facility_of_device_manager(device_manager_id)
			.await?;
		self.parent_facility_role(facility, Role::Contributor).await
	}

	async fn can_update_device_manager(&self, device_manager_id: &DeviceManagerId) -> Check {
		let facility = self
			.parents
			.facility_of_device_manager(device_manager_id)
			.await?;
		self.parent_facility_role(facility, Role::Admin).await
	}

	async fn can_create_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_read_device(device_id).await
	}

	async fn can_read_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_read_device(device_id).await
	}

	async fn can_update_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_read_device(device_id).await
	}

	// Facilities

	async fn can_create_facility(&self, site_id: &SiteId) -> Check {
		self.site_role(site_id, Role::Admin).await
	}

	async fn can_list_facilities(&self, site_id: &SiteId) -> Check {
		self.site_role(site_id, Role::Contributor).await
	}

	async fn can_read_facility(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_update_facility(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	async fn can_delete_facility(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Admin).await
	}

	async fn can_send_alert(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Contributor).await
	}

	// Storage locations

	async fn can_create_storage_location(&self, facility_id: &FacilityId) -> Check {
		self.facility_role(facility_id, Role::Admin).await
	}

	async fn can_read_storage_location(&self, storage_location_id: &StorageLocationId) -> Check {
		let facility = self
			.parents
			.facility_of_storage_location(storage_location_id)
			.await?;
		self.parent_facility_role(facility, Role::Contributor).await
	}

	async fn can_update_storage_location(&self, storage_location_id: &StorageLocationId) -> Check {
		let facility = self
			.parents
			.facility_of_storage_location(storage_location_id)
			.await?;
		self.parent_facility_role(facility, Role::Admin).await
	}

	async fn can_delete_storage_location(&self, storage_location_id: &StorageLocationId) -> Check {
		self.can_update_storage_location(storage_location_id).await
	}

	// Sites

	async fn can_create_site(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Admin).await
	}

	async fn can_list_sites(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Contributor).await
	}

	async fn can_read_site(&self, site_id: &SiteId) -> Check {
		self.site_role(site_id, Role::Contributor).await
	}

	async fn can_update_site(&self, site_id: &SiteId) -> Check {
		self.site_role(site_id, Role::Admin).await
	}

	async fn can_delete_site(&self, site_id: &SiteId) -> Check {
		self.site_role(site_id, Role::Admin).await
	}

	// Projects

	async fn can_create_project(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_list_projects(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Contributor).await
	}

	async fn can_read_project(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Contributor).await
	}

	async fn can_update_project(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Admin).await
	}

	async fn can_delete_project(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Admin).await
	}

	async fn can_add_project_user(&self, project_id: &ProjectId) -> Check {
		self.project_role(project_id, Role::Admin).await
	}

	async fn can_remove_project_user(&self, project_id: &ProjectId, user_id: &UserId) -> Check {
		if !self.project_role(project_id, Role::Contributor).await? {
			return Ok(false);
		}
		if *user_id == self.profile.user_id {
			return Ok(true);
		}
		self.can_add_project_user(project_id).await
	}

	// Organizations

	async fn can_read_organization(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Contributor).await
	}

	async fn can_update_organization(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_delete_organization(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Owner).await
	}

	async fn can_list_organization_users(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_add_organization_user(&self, organization_id: &OrganizationId, role: Role) -> Check {
		// Admin is required, and nobody may grant a role above their own.
		let required = if role.has_permission_of(Role::Admin) {
			role
		} else {
			Role::Admin
		};
		self.organization_role(organization_id, required).await
	}

	async fn can_remove_organization_user(
		&self,
		organization_id: &OrganizationId,
		user_id: &UserId,
	) -> Check {
		if !self
			.organization_role(organization_id, Role::Contributor)
			.await?
		{
			return Ok(false);
		}
		if *user_id == self.profile.user_id {
			return Ok(true);
		}
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_set_organization_user_role(
		&self,
		organization_id: &OrganizationId,
		role: Role,
	) -> Check {
		self.can_add_organization_user(organization_id, role).await
	}

	async fn can_add_terraformation_contact(&self, _organization_id: &OrganizationId) -> Check {
		self.has_global_role(GlobalRole::AcceleratorAdmin).await
	}

	async fn can_remove_terraformation_contact(&self, _organization_id: &OrganizationId) -> Check {
		self.has_global_role(GlobalRole::AcceleratorAdmin).await
	}

	async fn can_create_api_key(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_delete_api_key(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_list_api_keys(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	// Species

	async fn can_create_species(&self, organization_id: &OrganizationId) -> Check {
		self.organization_role(organization_id, Role::Admin).await
	}

	async fn can_read_species(&self, species_id: &SpeciesId) -> Check {
		match self.parents.organization_of_species(species_id).await? {
			Some(organization_id) => {
				self.organization_role(&organization_id, Role::Contributor)
					.await
			}
			None => Ok(false),
		}
	}

	async fn can_update_species(&self, species_id: &SpeciesId) -> Check {
		match self.parents.organization_of_species(species_id).await? {
			Some(organization_id) => self.organization_role(&organization_id, Role::Admin).await,
			None => Ok(false),
		}
	}

	async fn can_delete_species(&self, species_id: &SpeciesId) -> Check {
		self.can_update_species(species_id).await
	}

	async fn can_import_global_species_data(&self) -> Check {
		self.has_global_role(GlobalRole::SuperAdmin).await
	}

	// Notifications

	async fn can_read_notification(&self, notification_id: &NotificationId) -> Check {
		let owner = self.parents.user_of_notification(notification_id).await?;
		Ok(self.is_self(owner))
	}

	async fn can_list_notifications(&self, organization_id: Option<&OrganizationId>) -> Check {
		match organization_id {
			Some(organization_id) => {
				self.organization_role(organization_id, Role::Contributor)
					.await
			}
			None => Ok(true),
		}
	}

	async fn can_count_notifications(&self) -> Check {
		Ok(true)
	}

	async fn can_update_notification(&self, notification_id: &NotificationId) -> Check {
		self.can_read_notification(notification_id).await
	}

	async fn can_update_notifications(&self, organization_id: Option<&OrganizationId>) -> Check {
		self.can_list_notifications(organization_id).await
	}

	async fn can_create_notification(
		&self,
		target_user_id: &UserId,
		organization_id: &OrganizationId,
	) -> Check {
		if !self
			.organization_role(organization_id, Role::Contributor)
			.await?
		{
			return Ok(false);
		}
		let target_roles = self
			.permissions
			.fetch_organization_roles(target_user_id)
			.await?;
		Ok(target_roles.contains_key(organization_id))
	}

	// Uploads

	async fn can_read_upload(&self, upload_id: &UploadId) -> Check {
		let owner = self.parents.user_of_upload(upload_id).await?;
		Ok(self.is_self(owner))
	}

	async fn can_update_upload(&self, upload_id: &UploadId) -> Check {
		self.can_read_upload(upload_id).await
	}

	async fn can_delete_upload(&self, upload_id: &UploadId) -> Check {
		self.can_read_upload(upload_id).await
	}

	// Users and global roles

	async fn can_read_user(&self, user_id: &UserId) -> Check {
		if *user_id == self.profile.user_id {
			return Ok(true);
		}
		self.has_global_role(GlobalRole::ReadOnly).await
	}

	async fn can_delete_self(&self) -> Check {
		Ok(true)
	}

	async fn can_read_global_roles(&self) -> Check {
		self.has_global_role(GlobalRole::AcceleratorAdmin).await
	}

	async fn can_update_global_roles(&self) -> Check {
		self.has_global_role(GlobalRole::SuperAdmin).await
	}

	async fn can_read_funding_entity(&self, _funding_entity_id: &FundingEntityId) -> Check {
		self.has_global_role(GlobalRole::AcceleratorAdmin).await
	}
}
