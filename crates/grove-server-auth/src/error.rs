// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the permission core.
//!
//! Three layers, each with a narrower vocabulary than the one above it:
//!
//! - [`StoreError`]: an opaque failure from a backing store, propagated unchanged.
//! - [`IdentityError`]: what a capability check may fail with. Denial is never an
//!   error at this layer; it is `Ok(false)`.
//! - [`PermissionError`]: what the requirements façade returns. Not-found and
//!   access-denied are the only user-facing outcomes.

use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, FundingEntityId,
	NotificationId, OrganizationId, ProjectId, SiteId, SpeciesId, StorageLocationId, UploadId,
	UserId,
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`PermissionStore`](crate::store::PermissionStore),
/// [`ParentStore`](crate::store::ParentStore) or identity provider.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct StoreError(BoxError);

impl StoreError {
	pub fn new<E>(source: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self(Box::new(source))
	}

	/// Create a store error from a plain message.
	pub fn msg(message: impl Into<String>) -> Self {
		Self(message.into().into())
	}

	pub fn into_inner(self) -> BoxError {
		self.0
	}
}

/// Failure of a capability check or role-map accessor.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
	#[error("{operation} is not supported for {kind} identities")]
	Unsupported {
		kind: &'static str,
		operation: &'static str,
	},

	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Errors returned by [`PermissionRequirements`](crate::requirements::PermissionRequirements).
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
	// =========================================================================
	// Not found (object missing or invisible to the caller)
	// =========================================================================
	#[error("Accession {0} not found")]
	AccessionNotFound(AccessionId),

	#[error("Automation {0} not found")]
	AutomationNotFound(AutomationId),

	#[error("Device {0} not found")]
	DeviceNotFound(DeviceId),

	#[error("Device manager {0} not found")]
	DeviceManagerNotFound(DeviceManagerId),

	#[error("Facility {0} not found")]
	FacilityNotFound(FacilityId),

	#[error("Funding entity {0} not found")]
	FundingEntityNotFound(FundingEntityId),

	#[error("Notification {0} not found")]
	NotificationNotFound(NotificationId),

	#[error("Organization {0} not found")]
	OrganizationNotFound(OrganizationId),

	#[error("Project {0} not found")]
	ProjectNotFound(ProjectId),

	#[error("Site {0} not found")]
	SiteNotFound(SiteId),

	#[error("Species {0} not found")]
	SpeciesNotFound(SpeciesId),

	#[error("Storage location {0} not found")]
	StorageLocationNotFound(StorageLocationId),

	#[error("Timeseries for device {0} not found")]
	TimeseriesNotFound(DeviceId),

	#[error("Upload {0} not found")]
	UploadNotFound(UploadId),

	#[error("User {0} not found")]
	UserNotFound(UserId),

	// =========================================================================
	// Access denied (object visible, action not allowed)
	// =========================================================================
	#[error("{0}")]
	AccessDenied(String),

	// =========================================================================
	// Internal
	// =========================================================================
	#[error("Invalid identity operation: {operation} is not supported for {kind} identities")]
	InvalidIdentityOperation {
		kind: &'static str,
		operation: &'static str,
	},

	#[error("Store error: {0}")]
	Store(#[source] StoreError),
}

impl From<IdentityError> for PermissionError {
	fn from(e: IdentityError) -> Self {
		match e {
			IdentityError::Unsupported { kind, operation } => {
				PermissionError::InvalidIdentityOperation { kind, operation }
			}
			IdentityError::Store(e) => PermissionError::Store(e),
		}
	}
}

impl PermissionError {
	/// Returns true for programming errors and store failures that must not be
	/// shown to end users.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			PermissionError::InvalidIdentityOperation { .. } | PermissionError::Store(_)
		)
	}

	pub fn is_access_denied(&self) -> bool {
		matches!(self, PermissionError::AccessDenied(_))
	}

	pub fn is_not_found(&self) -> bool {
		!self.is_internal() && !self.is_access_denied()
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		if self.is_internal() {
			500
		} else if self.is_access_denied() {
			403
		} else {
			404
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn not_found_is_404() {
		let err = PermissionError::FacilityNotFound(FacilityId::generate());
		assert_eq!(err.status_code(), 404);
		assert!(err.is_not_found());
	}

	#[test]
	fn access_denied_is_403() {
		let err = PermissionError::AccessDenied("No permission".into());
		assert_eq!(err.status_code(), 403);
		assert!(!err.is_not_found());
	}

	#[test]
	fn unsupported_identity_operation_is_internal() {
		let err: PermissionError = IdentityError::Unsupported {
			kind: "system",
			operation: "organization_roles",
		}
		.into();
		assert!(err.is_internal());
		assert_eq!(err.status_code(), 500);
		assert!(!err.is_not_found());
		assert!(!err.is_access_denied());
	}

	#[test]
	fn store_errors_are_internal() {
		let err: PermissionError = IdentityError::from(StoreError::msg("connection reset")).into();
		assert!(err.is_internal());
		assert_eq!(err.to_string(), "Store error: connection reset");
	}

	#[test]
	fn not_found_message_names_entity() {
		let id = OrganizationId::generate();
		let err = PermissionError::OrganizationNotFound(id);
		assert_eq!(err.to_string(), format!("Organization {id} not found"));
	}
}
