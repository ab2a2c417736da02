// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative permission requirements.
//!
//! Each method states what the caller intends to do and fails if the current
//! identity may not do it. Nothing is performed; the call site reads as a
//! declaration:
//!
//! ```ignore
//! let require = PermissionRequirements::new(&ctx);
//! require.delete_facility(facility_id).await?;
//! ```
//!
//! # Error rules
//!
//! - Reads: if the check fails, the object is reported as not found. Objects
//!   the user cannot see behave as if they do not exist.
//! - Writes and deletes: if the check fails, the matching read requirement runs
//!   first, so an invisible object is still reported as not found. Otherwise the
//!   result is [`PermissionError::AccessDenied`].
//! - Creates: the read requirement for the parent runs first, then access is
//!   denied.
//! - Operations with no object (global roles, device manager creation) are
//!   denied outright.
//!
//! Identity failures pass through unchanged: store errors stay
//! [`PermissionError::Store`] and unsupported operations become
//! [`PermissionError::InvalidIdentityOperation`].

use std::sync::Arc;

use crate::context::{FrameGuard, RequestContext};
use crate::error::PermissionError;
use crate::identity::UserIdentity;
use crate::recorder::CheckRecorder;
use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, FundingEntityId,
	NotificationId, OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId,
	UploadId, UserId,
};

type Requirement = Result<(), PermissionError>;

fn denied(message: String) -> PermissionError {
	PermissionError::AccessDenied(message)
}

/// Restores an identity's previous recorder on drop.
struct AttachedRecorder {
	user: Arc<dyn UserIdentity>,
	previous: Option<Arc<CheckRecorder>>,
}

impl Drop for AttachedRecorder {
	fn drop(&mut self) {
		self.user.attach_recorder(self.previous.take());
	}
}

/// Active for the duration of one requirement.
struct Scope<'a> {
	_frame: FrameGuard<'a>,
	_recorder: Option<AttachedRecorder>,
}

pub struct PermissionRequirements<'a> {
	ctx: &'a RequestContext,
}

impl<'a> PermissionRequirements<'a> {
	pub fn new(ctx: &'a RequestContext) -> Self {
		Self { ctx }
	}

	fn user(&self) -> Arc<dyn UserIdentity> {
		self.ctx.current_user()
	}

	fn enter(&self, operation: &'static str) -> Scope<'a> {
		let frame = self.ctx.enter_permission(operation);
		let recorder = self.ctx.recorder().map(|recorder| {
			let user = self.ctx.current_user();
			let previous = user.attach_recorder(Some(Arc::clone(recorder)));
			AttachedRecorder { user, previous }
		});
		Scope {
			_frame: frame,
			_recorder: recorder,
		}
	}

	// =========================================================================
	// Organizations
	// =========================================================================

	pub async fn read_organization(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("read_organization");
		if self.user().can_read_organization(&organization_id).await? {
			return Ok(());
		}
		Err(PermissionError::OrganizationNotFound(organization_id))
	}

	pub async fn update_organization(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("update_organization");
		if self.user().can_update_organization(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to update organization {organization_id}"
		)))
	}

	pub async fn delete_organization(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("delete_organization");
		if self.user().can_delete_organization(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to delete organization {organization_id}"
		)))
	}

	pub async fn list_organization_users(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("list_organization_users");
		if self
			.user()
			.can_list_organization_users(&organization_id)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to list users in organization {organization_id}"
		)))
	}

	pub async fn add_organization_user(
		&self,
		organization_id: OrganizationId,
		role: Role,
	) -> Requirement {
		let _scope = self.enter("add_organization_user");
		if self
			.user()
			.can_add_organization_user(&organization_id, role)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to add users with role {role} to organization {organization_id}"
		)))
	}

	pub async fn remove_organization_user(
		&self,
		organization_id: OrganizationId,
		user_id: UserId,
	) -> Requirement {
		let _scope = self.enter("remove_organization_user");
		if self
			.user()
			.can_remove_organization_user(&organization_id, &user_id)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to remove user {user_id} from organization {organization_id}"
		)))
	}

	pub async fn set_organization_user_role(
		&self,
		organization_id: OrganizationId,
		role: Role,
	) -> Requirement {
		let _scope = self.enter("set_organization_user_role");
		if self
			.user()
			.can_set_organization_user_role(&organization_id, role)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to grant role {role} in organization {organization_id}"
		)))
	}

	pub async fn add_terraformation_contact(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("add_terraformation_contact");
		if self
			.user()
			.can_add_terraformation_contact(&organization_id)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to add terraformation contact to organization {organization_id}"
		)))
	}

	pub async fn remove_terraformation_contact(
		&self,
		organization_id: OrganizationId,
	) -> Requirement {
		let _scope = self.enter("remove_terraformation_contact");
		if self
			.user()
			.can_remove_terraformation_contact(&organization_id)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to remove terraformation contact from organization {organization_id}"
		)))
	}

	pub async fn create_api_key(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("create_api_key");
		if self.user().can_create_api_key(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to create API keys in organization {organization_id}"
		)))
	}

	pub async fn delete_api_key(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("delete_api_key");
		if self.user().can_delete_api_key(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to delete API keys in organization {organization_id}"
		)))
	}

	pub async fn list_api_keys(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("list_api_keys");
		if self.user().can_list_api_keys(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to list API keys in organization {organization_id}"
		)))
	}

	// =========================================================================
	// Projects
	// =========================================================================

	pub async fn create_project(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("create_project");
		if self.user().can_create_project(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to create projects in organization {organization_id}"
		)))
	}

	pub async fn list_projects(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("list_projects");
		if self.user().can_list_projects(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to list projects in organization {organization_id}"
		)))
	}

	pub async fn read_project(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("read_project");
		if self.user().can_read_project(&project_id).await? {
			return Ok(());
		}
		Err(PermissionError::ProjectNotFound(project_id))
	}

	pub async fn update_project(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("update_project");
		if self.user().can_update_project(&project_id).await? {
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!("No permission to update project {project_id}")))
	}

	pub async fn delete_project(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("delete_project");
		if self.user().can_delete_project(&project_id).await? {
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!("No permission to delete project {project_id}")))
	}

	pub async fn add_project_user(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("add_project_user");
		if self.user().can_add_project_user(&project_id).await? {
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!(
			"No permission to add users to project {project_id}"
		)))
	}

	pub async fn remove_project_user(&self, project_id: ProjectId, user_id: UserId) -> Requirement {
		let _scope = self.enter("remove_project_user");
		if self
			.user()
			.can_remove_project_user(&project_id, &user_id)
			.await?
		{
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!(
			"No permission to remove user {user_id} from project {project_id}"
		)))
	}

	// =========================================================================
	// Sites
	// =========================================================================

	pub async fn create_site(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("create_site");
		if self.user().can_create_site(&project_id).await? {
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!(
			"No permission to create sites in project {project_id}"
		)))
	}

	pub async fn list_sites(&self, project_id: ProjectId) -> Requirement {
		let _scope = self.enter("list_sites");
		if self.user().can_list_sites(&project_id).await? {
			return Ok(());
		}
		self.read_project(project_id).await?;
		Err(denied(format!(
			"No permission to list sites in project {project_id}"
		)))
	}

	pub async fn read_site(&self, site_id: SiteId) -> Requirement {
		let _scope = self.enter("read_site");
		if self.user().can_read_site(&site_id).await? {
			return Ok(());
		}
		Err(PermissionError::SiteNotFound(site_id))
	}

	pub async fn update_site(&self, site_id: SiteId) -> Requirement {
		let _scope = self.enter("update_site");
		if self.user().can_update_site(&site_id).await? {
			return Ok(());
		}
		self.read_site(site_id).await?;
		Err(denied(format!("No permission to update site {site_id}")))
	}

	pub async fn delete_site(&self, site_id: SiteId) -> Requirement {
		let _scope = self.enter("delete_site");
		if self.user().can_delete_site(&site_id).await? {
			return Ok(());
		}
		self.read_site(site_id).await?;
		Err(denied(format!("No permission to delete site {site_id}")))
	}

	// =========================================================================
	// Facilities
	// =========================================================================

	pub async fn create_facility(&self, site_id: SiteId) -> Requirement {
		let _scope = self.enter("create_facility");
		if self.user().can_create_facility(&site_id).await? {
			return Ok(());
		}
		self.read_site(site_id).await?;
		Err(denied(format!(
			"No permission to create facilities in site {site_id}"
		)))
	}

	pub async fn list_facilities(&self, site_id: SiteId) -> Requirement {
		let _scope = self.enter("list_facilities");
		if self.user().can_list_facilities(&site_id).await? {
			return Ok(());
		}
		self.read_site(site_id).await?;
		Err(denied(format!(
			"No permission to list facilities in site {site_id}"
		)))
	}

	pub async fn read_facility(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("read_facility");
		if self.user().can_read_facility(&facility_id).await? {
			return Ok(());
		}
		Err(PermissionError::FacilityNotFound(facility_id))
	}

	pub async fn update_facility(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("update_facility");
		if self.user().can_update_facility(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to update facility {facility_id}"
		)))
	}

	pub async fn delete_facility(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("delete_facility");
		if self.user().can_delete_facility(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to delete facility {facility_id}"
		)))
	}

	pub async fn send_alert(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("send_alert");
		if self.user().can_send_alert(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to send alerts for facility {facility_id}"
		)))
	}

	// =========================================================================
	// Accessions
	// =========================================================================

	pub async fn create_accession(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("create_accession");
		if self.user().can_create_accession(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to create accessions in facility {facility_id}"
		)))
	}

	pub async fn read_accession(&self, accession_id: AccessionId) -> Requirement {
		let _scope = self.enter("read_accession");
		if self.user().can_read_accession(&accession_id).await? {
			return Ok(());
		}
		Err(PermissionError::AccessionNotFound(accession_id))
	}

	pub async fn update_accession(&self, accession_id: AccessionId) -> Requirement {
		let _scope = self.enter("update_accession");
		if self.user().can_update_accession(&accession_id).await? {
			return Ok(());
		}
		self.read_accession(accession_id).await?;
		Err(denied(format!(
			"No permission to update accession {accession_id}"
		)))
	}

	// =========================================================================
	// Automations
	// =========================================================================

	pub async fn create_automation(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("create_automation");
		if self.user().can_create_automation(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to create automations in facility {facility_id}"
		)))
	}

	pub async fn list_automations(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("list_automations");
		if self.user().can_list_automations(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to list automations in facility {facility_id}"
		)))
	}

	pub async fn read_automation(&self, automation_id: AutomationId) -> Requirement {
		let _scope = self.enter("read_automation");
		if self.user().can_read_automation(&automation_id).await? {
			return Ok(());
		}
		Err(PermissionError::AutomationNotFound(automation_id))
	}

	pub async fn update_automation(&self, automation_id: AutomationId) -> Requirement {
		let _scope = self.enter("update_automation");
		if self.user().can_update_automation(&automation_id).await? {
			return Ok(());
		}
		self.read_automation(automation_id).await?;
		Err(denied(format!(
			"No permission to update automation {automation_id}"
		)))
	}

	pub async fn delete_automation(&self, automation_id: AutomationId) -> Requirement {
		let _scope = self.enter("delete_automation");
		if self.user().can_delete_automation(&automation_id).await? {
			return Ok(());
		}
		self.read_automation(automation_id).await?;
		Err(denied(format!(
			"No permission to delete automation {automation_id}"
		)))
	}

	pub async fn trigger_automation(&self, automation_id: AutomationId) -> Requirement {
		let _scope = self.enter("trigger_automation");
		if self.user().can_trigger_automation(&automation_id).await? {
			return Ok(());
		}
		self.read_automation(automation_id).await?;
		Err(denied(format!(
			"No permission to trigger automation {automation_id}"
		)))
	}

	// =========================================================================
	// Devices and timeseries
	// =========================================================================

	pub async fn create_device(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("create_device");
		if self.user().can_create_device(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to create devices in facility {facility_id}"
		)))
	}

	pub async fn read_device(&self, device_id: DeviceId) -> Requirement {
		let _scope = self.enter("read_device");
		if self.user().can_read_device(&device_id).await? {
			return Ok(());
		}
		Err(PermissionError::DeviceNotFound(device_id))
	}

	pub async fn update_device(&self, device_id: DeviceId) -> Requirement {
		let _scope = self.enter("update_device");
		if self.user().can_update_device(&device_id).await? {
			return Ok(());
		}
		self.read_device(device_id).await?;
		Err(denied(format!("No permission to update device {device_id}")))
	}

	pub async fn create_device_manager(&self) -> Requirement {
		let _scope = self.enter("create_device_manager");
		if self.user().can_create_device_manager().await? {
			return Ok(());
		}
		Err(denied("No permission to create device managers".to_string()))
	}

	pub async fn read_device_manager(&self, device_manager_id: DeviceManagerId) -> Requirement {
		let _scope = self.enter("read_device_manager");
		if self.user().can_read_device_manager(&device_manager_id).await? {
			return Ok(());
		}
		Err(PermissionError::DeviceManagerNotFound(device_manager_id))
	}

	pub async fn update_device_manager(&self, device_manager_id: DeviceManagerId) -> Requirement {
		let _scope = self.enter("update_device_manager");
		if self
			.user()
			.can_update_device_manager(&device_manager_id)
			.await?
		{
			return Ok(());
		}
		self.read_device_manager(device_manager_id).await?;
		Err(denied(format!(
			"No permission to update device manager {device_manager_id}"
		)))
	}

	pub async fn create_timeseries(&self, device_id: DeviceId) -> Requirement {
		let _scope = self.enter("create_timeseries");
		if self.user().can_create_timeseries(&device_id).await? {
			return Ok(());
		}
		self.read_device(device_id).await?;
		Err(denied(format!(
			"No permission to create timeseries on device {device_id}"
		)))
	}

	/// A visible device whose timeseries are hidden reports the timeseries as
	/// missing rather than the device.
	pub async fn read_timeseries(&self, device_id: DeviceId) -> Requirement {
		let _scope = self.enter("read_timeseries");
		if self.user().can_read_timeseries(&device_id).await? {
			return Ok(());
		}
		self.read_device(device_id).await?;
		Err(PermissionError::TimeseriesNotFound(device_id))
	}

	pub async fn update_timeseries(&self, device_id: DeviceId) -> Requirement {
		let _scope = self.enter("update_timeseries");
		if self.user().can_update_timeseries(&device_id).await? {
			return Ok(());
		}
		self.read_timeseries(device_id).await?;
		Err(denied(format!(
			"No permission to update timeseries on device {device_id}"
		)))
	}

	// =========================================================================
	// Storage locations
	// =========================================================================

	pub async fn create_storage_location(&self, facility_id: FacilityId) -> Requirement {
		let _scope = self.enter("create_storage_location");
		if self.user().can_create_storage_location(&facility_id).await? {
			return Ok(());
		}
		self.read_facility(facility_id).await?;
		Err(denied(format!(
			"No permission to create storage locations in facility {facility_id}"
		)))
	}

	pub async fn read_storage_location(&self, storage_location_id: StorageLocationId) -> Requirement {
		let _scope = self.enter("read_storage_location");
		if self
			.user()
			.can_read_storage_location(&storage_location_id)
			.await?
		{
			return Ok(());
		}
		Err(PermissionError::StorageLocationNotFound(storage_location_id))
	}

	pub async fn update_storage_location(
		&self,
		storage_location_id: StorageLocationId,
	) -> Requirement {
		let _scope = self.enter("update_storage_location");
		if self
			.user()
			.can_update_storage_location(&storage_location_id)
			.await?
		{
			return Ok(());
		}
		self.read_storage_location(storage_location_id).await?;
		Err(denied(format!(
			"No permission to update storage location {storage_location_id}"
		)))
	}

	pub async fn delete_storage_location(
		&self,
		storage_location_id: StorageLocationId,
	) -> Requirement {
		let _scope = self.enter("delete_storage_location");
		if self
			.user()
			.can_delete_storage_location(&storage_location_id)
			.await?
		{
			return Ok(());
		}
		self.read_storage_location(storage_location_id).await?;
		Err(denied(format!(
			"No permission to delete storage location {storage_location_id}"
		)))
	}

	// =========================================================================
	// Species
	// =========================================================================

	pub async fn create_species(&self, organization_id: OrganizationId) -> Requirement {
		let _scope = self.enter("create_species");
		if self.user().can_create_species(&organization_id).await? {
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to create species in organization {organization_id}"
		)))
	}

	pub async fn read_species(&self, species_id: SpeciesId) -> Requirement {
		let _scope = self.enter("read_species");
		if self.user().can_read_species(&species_id).await? {
			return Ok(());
		}
		Err(PermissionError::SpeciesNotFound(species_id))
	}

	pub async fn update_species(&self, species_id: SpeciesId) -> Requirement {
		let _scope = self.enter("update_species");
		if self.user().can_update_species(&species_id).await? {
			return Ok(());
		}
		self.read_species(species_id).await?;
		Err(denied(format!("No permission to update species {species_id}")))
	}

	pub async fn delete_species(&self, species_id: SpeciesId) -> Requirement {
		let _scope = self.enter("delete_species");
		if self.user().can_delete_species(&species_id).await? {
			return Ok(());
		}
		self.read_species(species_id).await?;
		Err(denied(format!("No permission to delete species {species_id}")))
	}

	pub async fn import_global_species_data(&self) -> Requirement {
		let _scope = self.enter("import_global_species_data");
		if self.user().can_import_global_species_data().await? {
			return Ok(());
		}
		Err(denied(
			"No permission to import global species data".to_string(),
		))
	}

	// =========================================================================
	// Notifications
	// =========================================================================

	pub async fn read_notification(&self, notification_id: NotificationId) -> Requirement {
		let _scope = self.enter("read_notification");
		if self.user().can_read_notification(&notification_id).await? {
			return Ok(());
		}
		Err(PermissionError::NotificationNotFound(notification_id))
	}

	pub async fn list_notifications(&self, organization_id: Option<OrganizationId>) -> Requirement {
		let _scope = self.enter("list_notifications");
		if self
			.user()
			.can_list_notifications(organization_id.as_ref())
			.await?
		{
			return Ok(());
		}
		match organization_id {
			Some(organization_id) => {
				self.read_organization(organization_id).await?;
				Err(denied(format!(
					"No permission to list notifications in organization {organization_id}"
				)))
			}
			None => Err(denied("No permission to list notifications".to_string())),
		}
	}

	pub async fn count_notifications(&self) -> Requirement {
		let _scope = self.enter("count_notifications");
		if self.user().can_count_notifications().await? {
			return Ok(());
		}
		Err(denied("No permission to count notifications".to_string()))
	}

	pub async fn update_notification(&self, notification_id: NotificationId) -> Requirement {
		let _scope = self.enter("update_notification");
		if self.user().can_update_notification(&notification_id).await? {
			return Ok(());
		}
		self.read_notification(notification_id).await?;
		Err(denied(format!(
			"No permission to update notification {notification_id}"
		)))
	}

	pub async fn update_notifications(
		&self,
		organization_id: Option<OrganizationId>,
	) -> Requirement {
		let _scope = self.enter("update_notifications");
		if self
			.user()
			.can_update_notifications(organization_id.as_ref())
			.await?
		{
			return Ok(());
		}
		match organization_id {
			Some(organization_id) => {
				self.read_organization(organization_id).await?;
				Err(denied(format!(
					"No permission to update notifications in organization {organization_id}"
				)))
			}
			None => Err(denied("No permission to update notifications".to_string())),
		}
	}

	pub async fn create_notification(
		&self,
		target_user_id: UserId,
		organization_id: OrganizationId,
	) -> Requirement {
		let _scope = self.enter("create_notification");
		if self
			.user()
			.can_create_notification(&target_user_id, &organization_id)
			.await?
		{
			return Ok(());
		}
		self.read_organization(organization_id).await?;
		Err(denied(format!(
			"No permission to notify user {target_user_id} in organization {organization_id}"
		)))
	}

	// =========================================================================
	// Uploads
	// =========================================================================

	pub async fn read_upload(&self, upload_id: UploadId) -> Requirement {
		let _scope = self.enter("read_upload");
		if self.user().can_read_upload(&upload_id).await? {
			return Ok(());
		}
		Err(PermissionError::UploadNotFound(upload_id))
	}

	pub async fn update_upload(&self, upload_id: UploadId) -> Requirement {
		let _scope = self.enter("update_upload");
		if self.user().can_update_upload(&upload_id).await? {
			return Ok(());
		}
		self.read_upload(upload_id).await?;
		Err(denied(format!("No permission to update upload {upload_id}")))
	}

	pub async fn delete_upload(&self, upload_id: UploadId) -> Requirement {
		let _scope = self.enter("delete_upload");
		if self.user().can_delete_upload(&upload_id).await? {
			return Ok(());
		}
		self.read_upload(upload_id).await?;
		Err(denied(format!("No permission to delete upload {upload_id}")))
	}

	// =========================================================================
	// Users and global roles
	// =========================================================================

	pub async fn read_user(&self, user_id: UserId) -> Requirement {
		let _scope = self.enter("read_user");
		if self.user().can_read_user(&user_id).await? {
			return Ok(());
		}
		Err(PermissionError::UserNotFound(user_id))
	}

	pub async fn delete_self(&self) -> Requirement {
		let _scope = self.enter("delete_self");
		if self.user().can_delete_self().await? {
			return Ok(());
		}
		Err(PermissionError::UserNotFound(self.user().user_id()))
	}

	pub async fn read_global_roles(&self) -> Requirement {
		let _scope = self.enter("read_global_roles");
		if self.user().can_read_global_roles().await? {
			return Ok(());
		}
		Err(denied("No permission to read global roles".to_string()))
	}

	pub async fn update_global_roles(&self) -> Requirement {
		let _scope = self.enter("update_global_roles");
		if self.user().can_update_global_roles().await? {
			return Ok(());
		}
		Err(denied("No permission to update global roles".to_string()))
	}

	pub async fn read_funding_entity(&self, funding_entity_id: FundingEntityId) -> Requirement {
		let _scope = self.enter("read_funding_entity");
		if self.user().can_read_funding_entity(&funding_entity_id).await? {
			return Ok(());
		}
		Err(PermissionError::FundingEntityNotFound(funding_entity_id))
	}
}
