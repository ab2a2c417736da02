// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity of a device manager (an on-site hub that talks to sensors).
//!
//! A device manager is bound to exactly one facility. It may operate devices and
//! automations there and raise alerts, and nothing else.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::UserIdentity;
use crate::error::{IdentityError, StoreError};
use crate::store::{FacilityRoles, OrganizationRoles, ParentStore, PermissionStore};
use crate::types::{
	AutomationId, DeviceId, DeviceManagerId, FacilityId, OrganizationId, Role, SiteId, UserId,
	UserType,
};

type Check = Result<bool, IdentityError>;

/// Where a device manager sits in the hierarchy, resolved once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceManagerBinding {
	pub device_manager_id: DeviceManagerId,
	pub facility_id: FacilityId,
	pub site_id: SiteId,
	pub organization_id: OrganizationId,
}

impl DeviceManagerBinding {
	/// Walk from a device-manager user up to its organization.
	///
	/// Returns `None` if the user has no device manager or any link of the chain
	/// is missing.
	pub async fn resolve(
		parents: &dyn ParentStore,
		user_id: &UserId,
	) -> Result<Option<Self>, StoreError> {
		let Some(device_manager_id) = parents.device_manager_of_user(user_id).await? else {
			return Ok(None);
		};
		let Some(facility_id) = parents.facility_of_device_manager(&device_manager_id).await? else {
			return Ok(None);
		};
		let Some(site_id) = parents.site_of_facility(&facility_id).await? else {
			return Ok(None);
		};
		let Some(organization_id) = parents.organization_of_facility(&facility_id).await? else {
			return Ok(None);
		};

		Ok(Some(Self {
			device_manager_id,
			facility_id,
			site_id,
			organization_id,
		}))
	}
}

pub struct DeviceManagerUser {
	user_id: UserId,
	auth_id: Option<String>,
	binding: DeviceManagerBinding,
	permissions: Arc<dyn PermissionStore>,
	parents: Arc<dyn ParentStore>,
}

impl DeviceManagerUser {
	pub fn new(
		user_id: UserId,
		auth_id: Option<String>,
		binding: DeviceManagerBinding,
		permissions: Arc<dyn PermissionStore>,
		parents: Arc<dyn ParentStore>,
	) -> Self {
		Self {
			user_id,
			auth_id,
			binding,
			permissions,
			parents,
		}
	}

	pub fn binding(&self) -> &DeviceManagerBinding {
		&self.binding
	}

	fn is_own_facility(&self, facility_id: Option<FacilityId>) -> bool {
		facility_id == Some(self.binding.facility_id)
	}

	async fn can_access_device(&self, device_id: &DeviceId) -> Check {
		let facility = self.parents.facility_of_device(device_id).await?;
		Ok(self.is_own_facility(facility))
	}

	async fn can_access_automation(&self, automation_id: &AutomationId) -> Check {
		let facility = self.parents.facility_of_automation(automation_id).await?;
		Ok(self.is_own_facility(facility))
	}
}

#[async_trait]
impl UserIdentity for DeviceManagerUser {
	fn user_id(&self) -> UserId {
		self.user_id
	}

	fn user_type(&self) -> UserType {
		UserType::DeviceManager
	}

	fn auth_id(&self) -> Option<&str> {
		self.auth_id.as_deref()
	}

	fn default_permission(&self) -> bool {
		false
	}

	async fn organization_roles(&self) -> Result<Arc<OrganizationRoles>, IdentityError> {
		Ok(Arc::new(HashMap::from([(
			self.binding.organization_id,
			Role::Contributor,
		)])))
	}

	async fn facility_roles(&self) -> Result<Arc<FacilityRoles>, IdentityError> {
		Ok(Arc::new(HashMap::from([(
			self.binding.facility_id,
			Role::Contributor,
		)])))
	}

	async fn can_create_automation(&self, facility_id: &FacilityId) -> Check {
		Ok(self.is_own_facility(Some(*facility_id)))
	}

	async fn can_list_automations(&self, facility_id: &FacilityId) -> Check {
		Ok(self.is_own_facility(Some(*facility_id)))
	}

	async fn can_read_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_access_automation(automation_id).await
	}

	async fn can_update_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_access_automation(automation_id).await
	}

	async fn can_delete_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_access_automation(automation_id).await
	}

	async fn can_trigger_automation(&self, automation_id: &AutomationId) -> Check {
		self.can_access_automation(automation_id).await
	}

	async fn can_create_device(&self, facility_id: &FacilityId) -> Check {
		Ok(self.is_own_facility(Some(*facility_id)))
	}

	async fn can_read_device(&self, device_id: &DeviceId) -> Check {
		self.can_access_device(device_id).await
	}

	async fn can_update_device(&self, device_id: &DeviceId) -> Check {
		self.can_access_device(device_id).await
	}

	async fn can_create_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_access_device(device_id).await
	}

	async fn can_read_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_access_device(device_id).await
	}

	async fn can_update_timeseries(&self, device_id: &DeviceId) -> Check {
		self.can_access_device(device_id).await
	}

	async fn can_read_device_manager(&self, device_manager_id: &DeviceManagerId) -> Check {
		Ok(*device_manager_id == self.binding.device_manager_id)
	}

	async fn can_list_facilities(&self, site_id: &SiteId) -> Check {
		Ok(*site_id == self.binding.site_id)
	}

	async fn can_read_facility(&self, facility_id: &FacilityId) -> Check {
		Ok(self.is_own_facility(Some(*facility_id)))
	}

	async fn can_send_alert(&self, facility_id: &FacilityId) -> Check {
		Ok(self.is_own_facility(Some(*facility_id)))
	}

	async fn can_read_organization(&self, organization_id: &OrganizationId) -> Check {
		Ok(*organization_id == self.binding.organization_id)
	}

	async fn can_create_notification(
		&self,
		target_user_id: &UserId,
		organization_id: &OrganizationId,
	) -> Check {
		if *organization_id != self.binding.organization_id {
			return Ok(false);
		}
		let target_roles = self
			.permissions
			.fetch_organization_roles(target_user_id)
			.await?;
		Ok(target_roles.contains_key(organization_id))
	}
}
