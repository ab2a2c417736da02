// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the permission system.
//!
//! This module defines the foundational types used throughout the permission core:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for every entity that takes part
//!   in permission checks ([`UserId`], [`OrganizationId`], [`FacilityId`], etc.)
//! - **Role enums**: Organization-scoped [`Role`] and system-wide [`GlobalRole`], each
//!   with a fixed numeric level used for comparisons
//! - **User types**: Classification of identities ([`UserType`])
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(OrganizationId, "Unique identifier for an organization.");
define_id_type!(ProjectId, "Unique identifier for a project.");
define_id_type!(SiteId, "Unique identifier for a site.");
define_id_type!(FacilityId, "Unique identifier for a facility.");
define_id_type!(AccessionId, "Unique identifier for a seed accession.");
define_id_type!(AutomationId, "Unique identifier for a facility automation.");
define_id_type!(DeviceId, "Unique identifier for a device.");
define_id_type!(DeviceManagerId, "Unique identifier for a device manager.");
define_id_type!(SpeciesId, "Unique identifier for a species.");
define_id_type!(StorageLocationId, "Unique identifier for a storage location.");
define_id_type!(NotificationId, "Unique identifier for a notification.");
define_id_type!(UploadId, "Unique identifier for an upload.");
define_id_type!(FundingEntityId, "Unique identifier for a funding entity.");

/// Error returned when a role or user type string does not name a known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseRoleError {
	pub kind: &'static str,
	pub value: String,
}

// =============================================================================
// Organization Roles
// =============================================================================

/// Roles within an organization, ordered from least to most privileged.
///
/// Projects, sites and facilities have no roles of their own: a user's role at
/// any of those scopes is the role they hold in the owning organization.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Can see and contribute to everything the organization shares with them.
	Contributor,
	/// Can manage day-to-day data and see the member list.
	Manager,
	/// Can manage members, projects, sites and facilities.
	Admin,
	/// Full control, including deleting the organization.
	Owner,
	/// Staff contact assigned to the organization.
	TerraformationContact,
}

impl Role {
	/// Returns all organization roles in ascending order.
	pub fn all() -> &'static [Role] {
		&[
			Role::Contributor,
			Role::Manager,
			Role::Admin,
			Role::Owner,
			Role::TerraformationContact,
		]
	}

	/// Numeric level used when comparing roles.
	pub fn level(self) -> u8 {
		match self {
			Role::Contributor => 1,
			Role::Manager => 2,
			Role::Admin => 3,
			Role::Owner => 4,
			Role::TerraformationContact => 5,
		}
	}

	/// Returns true if this role satisfies a requirement of `required`.
	pub fn has_permission_of(self, required: Role) -> bool {
		self.level() >= required.level()
	}

	pub fn is_admin_or_higher(self) -> bool {
		self.has_permission_of(Role::Admin)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Contributor => write!(f, "contributor"),
			Role::Manager => write!(f, "manager"),
			Role::Admin => write!(f, "admin"),
			Role::Owner => write!(f, "owner"),
			Role::TerraformationContact => write!(f, "terraformation_contact"),
		}
	}
}

impl FromStr for Role {
	type Err = ParseRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"contributor" => Ok(Role::Contributor),
			"manager" => Ok(Role::Manager),
			"admin" => Ok(Role::Admin),
			"owner" => Ok(Role::Owner),
			"terraformation_contact" => Ok(Role::TerraformationContact),
			other => Err(ParseRoleError {
				kind: "role",
				value: other.to_string(),
			}),
		}
	}
}

// =============================================================================
// Global Roles
// =============================================================================

/// System-wide roles, orthogonal to organization membership.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
	/// Read-only access to internal data across organizations.
	ReadOnly,
	/// Subject-matter expert with access to internal review tooling.
	#[serde(rename = "tf_expert")]
	TFExpert,
	/// Manages accelerator programs and organization contacts.
	AcceleratorAdmin,
	/// Full system access.
	SuperAdmin,
}

impl GlobalRole {
	/// Returns all global roles in ascending order.
	pub fn all() -> &'static [GlobalRole] {
		&[
			GlobalRole::ReadOnly,
			GlobalRole::TFExpert,
			GlobalRole::AcceleratorAdmin,
			GlobalRole::SuperAdmin,
		]
	}

	/// Numeric level used when comparing global roles.
	pub fn level(self) -> u8 {
		match self {
			GlobalRole::ReadOnly => 1,
			GlobalRole::TFExpert => 2,
			GlobalRole::AcceleratorAdmin => 3,
			GlobalRole::SuperAdmin => 4,
		}
	}

	pub fn has_permission_of(self, required: GlobalRole) -> bool {
		self.level() >= required.level()
	}
}

impl fmt::Display for GlobalRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GlobalRole::ReadOnly => write!(f, "read_only"),
			GlobalRole::TFExpert => write!(f, "tf_expert"),
			GlobalRole::AcceleratorAdmin => write!(f, "accelerator_admin"),
			GlobalRole::SuperAdmin => write!(f, "super_admin"),
		}
	}
}

impl FromStr for GlobalRole {
	type Err = ParseRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"read_only" => Ok(GlobalRole::ReadOnly),
			"tf_expert" => Ok(GlobalRole::TFExpert),
			"accelerator_admin" => Ok(GlobalRole::AcceleratorAdmin),
			"super_admin" => Ok(GlobalRole::SuperAdmin),
			other => Err(ParseRoleError {
				kind: "global role",
				value: other.to_string(),
			}),
		}
	}
}

// =============================================================================
// User Types
// =============================================================================

/// Kind of identity a user row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
	/// A person signed in through the identity provider.
	Individual,
	/// A programmatic client acting for an organization.
	ApiClient,
	/// A device manager bound to a single facility.
	DeviceManager,
	/// An external funder with read access to shared material.
	Funder,
	/// Internal identity for background work.
	System,
}

impl fmt::Display for UserType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserType::Individual => write!(f, "individual"),
			UserType::ApiClient => write!(f, "api_client"),
			UserType::DeviceManager => write!(f, "device_manager"),
			UserType::Funder => write!(f, "funder"),
			UserType::System => write!(f, "system"),
		}
	}
}

impl FromStr for UserType {
	type Err = ParseRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"individual" => Ok(UserType::Individual),
			"api_client" => Ok(UserType::ApiClient),
			"device_manager" => Ok(UserType::DeviceManager),
			"funder" => Ok(UserType::Funder),
			"system" => Ok(UserType::System),
			other => Err(ParseRoleError {
				kind: "user type",
				value: other.to_string(),
			}),
		}
	}
}
