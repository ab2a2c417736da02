// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identities and their capability checks.
//!
//! Every kind of identity that can act in the system implements [`UserIdentity`].
//! The trait is a large, flat surface of `can_*` methods taking the most specific
//! context available, even where the current rules are coarse. A caller asking
//! whether a site can be created passes the project, not the organization, so
//! finer-grained rules can be introduced later without touching call sites.
//!
//! # Contract
//!
//! - A capability method returns `Ok(false)` when the target does not exist or
//!   is outside the identity's role maps. A successful check therefore proves
//!   the object existed when the roles were loaded.
//! - `Err` is reserved for store failures and operations the identity kind does
//!   not support. Denial is never an error.
//! - Methods an identity does not override return [`UserIdentity::default_permission`].
//!
//! # Variants
//!
//! - [`IndividualUser`]: people and API clients, governed by role maps.
//! - [`DeviceManagerUser`]: bound to one facility, with a small whitelist.
//! - [`FunderUser`]: external viewers, denied by default.
//! - [`SystemUser`]: background work, granted everything.

mod cache;
mod device_manager;
mod funder;
mod individual;
mod system;

pub use cache::RoleCache;
pub use device_manager::{DeviceManagerBinding, DeviceManagerUser};
pub use funder::FunderUser;
pub use individual::{IndividualUser, UserProfile};
pub use system::SystemUser;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::IdentityError;
use crate::recorder::CheckRecorder;
use crate::store::{FacilityRoles, GlobalRoles, OrganizationRoles, ProjectRoles, SiteRoles};
use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, FundingEntityId,
	NotificationId, OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId,
	UploadId, UserId, UserType,
};

/// Build a display name from optional name parts.
pub fn make_full_name(first_name: Option<&str>, last_name: Option<&str>) -> Option<String> {
	match (first_name, last_name) {
		(Some(first), Some(last)) => Some(format!("{first} {last}")),
		(first, last) => last.or(first).map(str::to_string),
	}
}

type Check = Result<bool, IdentityError>;

#[async_trait]
pub trait UserIdentity: Send + Sync {
	fn user_id(&self) -> UserId;
	fn user_type(&self) -> UserType;

	/// Identity-provider subject, if the identity has one.
	fn auth_id(&self) -> Option<&str> {
		None
	}

	fn username(&self) -> String {
		self.auth_id().unwrap_or_default().to_string()
	}

	fn funding_entity_id(&self) -> Option<FundingEntityId> {
		None
	}

	/// Value returned by every capability this identity does not override.
	fn default_permission(&self) -> bool;

	// =========================================================================
	// Role maps
	// =========================================================================

	async fn organization_roles(&self) -> Result<Arc<OrganizationRoles>, IdentityError> {
		Ok(Arc::default())
	}

	async fn project_roles(&self) -> Result<Arc<ProjectRoles>, IdentityError> {
		Ok(Arc::default())
	}

	async fn site_roles(&self) -> Result<Arc<SiteRoles>, IdentityError> {
		Ok(Arc::default())
	}

	async fn facility_roles(&self) -> Result<Arc<FacilityRoles>, IdentityError> {
		Ok(Arc::default())
	}

	async fn global_roles(&self) -> Result<Arc<GlobalRoles>, IdentityError> {
		Ok(Arc::default())
	}

	/// Forget cached role maps, e.g. after changing this user's memberships.
	async fn clear_cached_permissions(&self) {}

	/// Install a recorder for permission checks, returning the previous one.
	/// Identities that do not record checks ignore this.
	///
	/// The recorder lives on the identity, so an identity must belong to one
	/// request. Two contexts sharing the same `Arc` would record into whichever
	/// recorder was attached last; load a fresh identity per request instead.
	fn attach_recorder(&self, _recorder: Option<Arc<CheckRecorder>>) -> Option<Arc<CheckRecorder>> {
		None
	}

	async fn has_any_admin_role(&self) -> Check {
		Ok(self
			.organization_roles()
			.await?
			.values()
			.any(|role| role.is_admin_or_higher()))
	}

	async fn is_admin_or_higher(&self, organization_id: &OrganizationId) -> Check {
		Ok(self
			.organization_roles()
			.await?
			.get(organization_id)
			.is_some_and(|role| role.is_admin_or_higher()))
	}

	async fn admin_organizations(&self) -> Result<HashSet<OrganizationId>, IdentityError> {
		Ok(self
			.organization_roles()
			.await?
			.iter()
			.filter(|(_, role)| role.is_admin_or_higher())
			.map(|(id, _)| *id)
			.collect())
	}

	// =========================================================================
	// Accessions
	// =========================================================================

	async fn can_create_accession(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_accession(&self, _accession_id: &AccessionId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_accession(&self, _accession_id: &AccessionId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Automations
	// =========================================================================

	async fn can_create_automation(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_automations(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_automation(&self, _automation_id: &AutomationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_automation(&self, _automation_id: &AutomationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_automation(&self, _automation_id: &AutomationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_trigger_automation(&self, _automation_id: &AutomationId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Devices and device managers
	// =========================================================================

	async fn can_create_device(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_device(&self, _device_id: &DeviceId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_device(&self, _device_id: &DeviceId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_create_device_manager(&self) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_device_manager(&self, _device_manager_id: &DeviceManagerId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_device_manager(&self, _device_manager_id: &DeviceManagerId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_create_timeseries(&self, _device_id: &DeviceId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_timeseries(&self, _device_id: &DeviceId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_timeseries(&self, _device_id: &DeviceId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Facilities
	// =========================================================================

	async fn can_create_facility(&self, _site_id: &SiteId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_facilities(&self, _site_id: &SiteId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_facility(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_facility(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_facility(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_send_alert(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Storage locations
	// =========================================================================

	async fn can_create_storage_location(&self, _facility_id: &FacilityId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_storage_location(&self, _storage_location_id: &StorageLocationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_storage_location(&self, _storage_location_id: &StorageLocationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_storage_location(&self, _storage_location_id: &StorageLocationId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Sites
	// =========================================================================

	async fn can_create_site(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_sites(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_site(&self, _site_id: &SiteId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_site(&self, _site_id: &SiteId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_site(&self, _site_id: &SiteId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Projects
	// =========================================================================

	async fn can_create_project(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_projects(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_project(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_project(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_project(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_add_project_user(&self, _project_id: &ProjectId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_remove_project_user(&self, _project_id: &ProjectId, _user_id: &UserId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Organizations
	// =========================================================================

	async fn can_read_organization(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_organization(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_organization(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_organization_users(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_add_organization_user(&self, _organization_id: &OrganizationId, _role: Role) -> Check {
		Ok(self.default_permission())
	}

	async fn can_remove_organization_user(
		&self,
		_organization_id: &OrganizationId,
		_user_id: &UserId,
	) -> Check {
		Ok(self.default_permission())
	}

	async fn can_set_organization_user_role(
		&self,
		_organization_id: &OrganizationId,
		_role: Role,
	) -> Check {
		Ok(self.default_permission())
	}

	async fn can_add_terraformation_contact(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_remove_terraformation_contact(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_create_api_key(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_api_key(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_api_keys(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Species
	// =========================================================================

	async fn can_create_species(&self, _organization_id: &OrganizationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_species(&self, _species_id: &SpeciesId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_species(&self, _species_id: &SpeciesId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_species(&self, _species_id: &SpeciesId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_import_global_species_data(&self) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Notifications
	// =========================================================================

	async fn can_read_notification(&self, _notification_id: &NotificationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_list_notifications(&self, _organization_id: Option<&OrganizationId>) -> Check {
		Ok(self.default_permission())
	}

	async fn can_count_notifications(&self) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_notification(&self, _notification_id: &NotificationId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_notifications(&self, _organization_id: Option<&OrganizationId>) -> Check {
		Ok(self.default_permission())
	}

	async fn can_create_notification(
		&self,
		_target_user_id: &UserId,
		_organization_id: &OrganizationId,
	) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Uploads
	// =========================================================================

	async fn can_read_upload(&self, _upload_id: &UploadId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_upload(&self, _upload_id: &UploadId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_upload(&self, _upload_id: &UploadId) -> Check {
		Ok(self.default_permission())
	}

	// =========================================================================
	// Users, global roles and funders
	// =========================================================================

	async fn can_read_user(&self, _user_id: &UserId) -> Check {
		Ok(self.default_permission())
	}

	async fn can_delete_self(&self) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_global_roles(&self) -> Check {
		Ok(self.default_permission())
	}

	async fn can_update_global_roles(&self) -> Check {
		Ok(self.default_permission())
	}

	async fn can_read_funding_entity(&self, _funding_entity_id: &FundingEntityId) -> Check {
		Ok(self.default_permission())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_name_joins_both_parts() {
		assert_eq!(
			make_full_name(Some("Ada"), Some("Lovelace")),
			Some("Ada Lovelace".to_string())
		);
	}

	#[test]
	fn full_name_falls_back_to_single_part() {
		assert_eq!(make_full_name(None, Some("Lovelace")), Some("Lovelace".to_string()));
		assert_eq!(make_full_name(Some("Ada"), None), Some("Ada".to_string()));
		assert_eq!(make_full_name(None, None), None);
	}
}
