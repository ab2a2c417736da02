// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchical role-based permission core for Grove.
//!
//! Users hold one role per organization plus any number of global roles. Access
//! to projects, sites and facilities is derived from the organization role by a
//! [`PermissionStore`]. Every kind of identity implements [`UserIdentity`], a flat
//! surface of `can_*` capability checks, and [`PermissionRequirements`] turns
//! those checks into not-found or access-denied errors.
//!
//! # Architecture
//!
//! - `types` - ID newtypes, [`Role`], [`GlobalRole`] and [`UserType`]
//! - `store` - Traits for role resolution and parent lookups
//! - `identity` - Identity variants and their capability rules
//! - `context` - Request-scoped identity, call stack and recorder
//! - `requirements` - Declarative permission requirements
//! - `check` / `recorder` - Permission check records and inversion detection
//!
//! # Example
//!
//! ```ignore
//! use grove_server_auth::{PermissionRequirements, RequestContext};
//!
//! let ctx = RequestContext::new(user).recording(config.permissions.record_checks);
//! let _entry = ctx.enter_entry_point("FacilitiesController", "delete");
//!
//! PermissionRequirements::new(&ctx).delete_facility(facility_id).await?;
//! ```

pub mod check;
pub mod context;
pub mod error;
pub mod identity;
pub mod provider;
pub mod recorder;
pub mod requirements;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use check::{CallFrame, CheckKind, FrameKind, PermissionCheck, TargetId};
pub use context::{CallStack, FrameGuard, RequestContext};
pub use error::{IdentityError, PermissionError, StoreError};
pub use identity::{
	make_full_name, DeviceManagerBinding, DeviceManagerUser, FunderUser, IndividualUser,
	RoleCache, SystemUser, UserIdentity, UserProfile,
};
pub use provider::{IdentityProvider, ProviderProfile};
pub use recorder::{find_inversions, CheckRecorder, Inversion, InversionReport};
pub use requirements::PermissionRequirements;
pub use store::{
	FacilityRoles, GlobalRoles, OrganizationRoles, ParentStore, PermissionStore, ProjectRoles,
	SiteRoles,
};
pub use types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, FundingEntityId, GlobalRole,
	NotificationId, OrganizationId, ParseRoleError, ProjectId, Role, SiteId, SpeciesId,
	StorageLocationId, UploadId, UserId, UserType,
};
