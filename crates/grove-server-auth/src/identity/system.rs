// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internal identity for background work. It may do anything, but it has no
//! role maps, so asking for them is a programming error.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::UserIdentity;
use crate::error::IdentityError;
use crate::store::{FacilityRoles, GlobalRoles, OrganizationRoles, ProjectRoles, SiteRoles};
use crate::types::{OrganizationId, UserId, UserType};

const USERNAME: &str = "system";

fn unsupported(operation: &'static str) -> IdentityError {
	IdentityError::Unsupported {
		kind: USERNAME,
		operation,
	}
}

#[derive(Debug, Clone)]
pub struct SystemUser {
	user_id: UserId,
}

impl SystemUser {
	pub fn new(user_id: UserId) -> Self {
		Self { user_id }
	}
}

#[async_trait]
impl UserIdentity for SystemUser {
	fn user_id(&self) -> UserId {
		self.user_id
	}

	fn user_type(&self) -> UserType {
		UserType::System
	}

	fn auth_id(&self) -> Option<&str> {
		Some(USERNAME)
	}

	fn username(&self) -> String {
		USERNAME.to_string()
	}

	fn default_permission(&self) -> bool {
		true
	}

	async fn organization_roles(&self) -> Result<Arc<OrganizationRoles>, IdentityError> {
		Err(unsupported("organization_roles"))
	}

	async fn project_roles(&self) -> Result<Arc<ProjectRoles>, IdentityError> {
		Err(unsupported("project_roles"))
	}

	async fn site_roles(&self) -> Result<Arc<SiteRoles>, IdentityError> {
		Err(unsupported("site_roles"))
	}

	async fn facility_roles(&self) -> Result<Arc<FacilityRoles>, IdentityError> {
		Err(unsupported("facility_roles"))
	}

	async fn global_roles(&self) -> Result<Arc<GlobalRoles>, IdentityError> {
		Err(unsupported("global_roles"))
	}

	async fn has_any_admin_role(&self) -> Result<bool, IdentityError> {
		Ok(true)
	}

	async fn is_admin_or_higher(&self, _organization_id: &OrganizationId) -> Result<bool, IdentityError> {
		Ok(true)
	}

	async fn admin_organizations(&self) -> Result<HashSet<OrganizationId>, IdentityError> {
		Err(unsupported("admin_organizations"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{FacilityId, Role, SpeciesId};

	#[tokio::test]
	async fn every_capability_is_granted() {
		let user = SystemUser::new(UserId::generate());
		assert!(user.can_read_facility(&FacilityId::generate()).await.unwrap());
		assert!(user.can_update_species(&SpeciesId::generate()).await.unwrap());
		assert!(user.can_import_global_species_data().await.unwrap());
		assert!(user
			.can_add_organization_user(&OrganizationId::generate(), Role::TerraformationContact)
			.await
			.unwrap());
		assert!(user.has_any_admin_role().await.unwrap());
	}

	#[tokio::test]
	async fn role_maps_are_unsupported() {
		let user = SystemUser::new(UserId::generate());
		assert!(matches!(
			user.organization_roles().await,
			Err(IdentityError::Unsupported {
				kind: "system",
				operation: "organization_roles"
			})
		));
		assert!(user.global_roles().await.is_err());
		assert!(user.admin_organizations().await.is_err());
	}

	#[test]
	fn username_is_fixed() {
		let user = SystemUser::new(UserId::generate());
		assert_eq!(user.username(), "system");
		assert_eq!(user.user_type(), UserType::System);
	}
}
