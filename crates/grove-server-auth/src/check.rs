// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Records of permission checks and the comparisons used to find inversions.
//!
//! An inversion is an operation that needs a stricter permission but runs inside
//! code that only checked a weaker one. These have historically shown up in event
//! handlers that fan out to several downstream operations under one broad guard.
//! Each evaluated check is captured as a [`PermissionCheck`] together with the
//! explicit call frames active at the time, so two checks can later be compared
//! with [`PermissionCheck::is_guarded_by`], [`PermissionCheck::is_stricter_than`]
//! and [`PermissionCheck::is_implied_by`].

use std::fmt;

use crate::types::{FacilityId, GlobalRole, OrganizationId, ProjectId, Role, SiteId};

// =============================================================================
// Call frames
// =============================================================================

/// Where a call frame sits relative to the permission machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
	/// Request handler or test harness boundary. Frames at and below the
	/// innermost entry point are not part of a captured stack.
	EntryPoint,
	/// Application code.
	Application,
	/// A declarative permission requirement. Frames from here inward belong to
	/// the checking machinery.
	Permission,
}

/// One explicitly pushed frame of the logical call chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallFrame {
	pub component: &'static str,
	pub operation: &'static str,
	pub kind: FrameKind,
}

impl CallFrame {
	pub fn new(component: &'static str, operation: &'static str, kind: FrameKind) -> Self {
		Self {
			component,
			operation,
			kind,
		}
	}

	pub fn application(component: &'static str, operation: &'static str) -> Self {
		Self::new(component, operation, FrameKind::Application)
	}

	fn same_site(&self, other: &CallFrame) -> bool {
		self.component == other.component && self.operation == other.operation
	}
}

impl fmt::Display for CallFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.component, self.operation)
	}
}

// =============================================================================
// Check targets
// =============================================================================

/// Scope a role check was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetId {
	Organization(OrganizationId),
	Project(ProjectId),
	Site(SiteId),
	Facility(FacilityId),
}

impl fmt::Display for TargetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TargetId::Organization(id) => write!(f, "OrganizationId({id})"),
			TargetId::Project(id) => write!(f, "ProjectId({id})"),
			TargetId::Site(id) => write!(f, "SiteId({id})"),
			TargetId::Facility(id) => write!(f, "FacilityId({id})"),
		}
	}
}

impl From<OrganizationId> for TargetId {
	fn from(id: OrganizationId) -> Self {
		TargetId::Organization(id)
	}
}

impl From<ProjectId> for TargetId {
	fn from(id: ProjectId) -> Self {
		TargetId::Project(id)
	}
}

impl From<SiteId> for TargetId {
	fn from(id: SiteId) -> Self {
		TargetId::Site(id)
	}
}

impl From<FacilityId> for TargetId {
	fn from(id: FacilityId) -> Self {
		TargetId::Facility(id)
	}
}

// =============================================================================
// Permission checks
// =============================================================================

/// What a check asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
	/// The user holds at least `role` at `target`.
	Role { role: Role, target: TargetId },
	/// The user holds `role` or a higher global role.
	GlobalRole { role: GlobalRole },
}

/// Immutable record of a permission check that was evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
	kind: CheckKind,
	granted: bool,
	call_stack: Option<Vec<CallFrame>>,
}

impl PermissionCheck {
	pub fn new(kind: CheckKind, granted: bool) -> Self {
		Self {
			kind,
			granted,
			call_stack: None,
		}
	}

	pub fn role(role: Role, target: impl Into<TargetId>) -> Self {
		Self::new(
			CheckKind::Role {
				role,
				target: target.into(),
			},
			true,
		)
	}

	pub fn global_role(role: GlobalRole) -> Self {
		Self::new(CheckKind::GlobalRole { role }, true)
	}

	/// Attach the captured call stack, outermost frame first.
	pub fn with_call_stack(mut self, frames: Vec<CallFrame>) -> Self {
		self.call_stack = Some(frames);
		self
	}

	pub fn kind(&self) -> &CheckKind {
		&self.kind
	}

	pub fn is_granted(&self) -> bool {
		self.granted
	}

	pub fn call_stack(&self) -> Option<&[CallFrame]> {
		self.call_stack.as_deref()
	}

	/// Returns true if this check asks for the same thing as `other` at a
	/// strictly higher level.
	pub fn is_stricter_than(&self, other: &PermissionCheck) -> bool {
		match (&self.kind, &other.kind) {
			(
				CheckKind::Role { role, target },
				CheckKind::Role {
					role: other_role,
					target: other_target,
				},
			) => target == other_target && role.level() > other_role.level(),
			(CheckKind::GlobalRole { role }, CheckKind::GlobalRole { role: other_role }) => {
				role.level() > other_role.level()
			}
			_ => false,
		}
	}

	/// Returns true if a successful `guard` already covers this check: either
	/// the guard is stricter, or it is the identical check.
	pub fn is_implied_by(&self, guard: &PermissionCheck) -> bool {
		guard.is_stricter_than(self) || guard.kind == self.kind
	}

	/// Returns true if this check ran in the same function as `earlier`, or in
	/// a function called (possibly indirectly) from it.
	///
	/// Frames belonging to the permission machinery are ignored on both sides.
	/// The remaining stacks are compared outermost first, stopping at the end of
	/// the shorter one.
	pub fn is_guarded_by(&self, earlier: &PermissionCheck) -> bool {
		let (Some(earlier_stack), Some(current_stack)) = (&earlier.call_stack, &self.call_stack)
		else {
			return false;
		};

		caller_frames(earlier_stack)
			.zip(caller_frames(current_stack))
			.all(|(earlier_frame, later_frame)| earlier_frame.same_site(later_frame))
	}

	pub fn pretty_print_stack(&self) -> String {
		match &self.call_stack {
			Some(frames) => frames
				.iter()
				.rev()
				.map(|frame| format!("    {frame}"))
				.collect::<Vec<_>>()
				.join("\n"),
			None => "N/A".to_string(),
		}
	}
}

/// Frames of the code that invoked the permission machinery, outermost first.
fn caller_frames(stack: &[CallFrame]) -> impl Iterator<Item = &CallFrame> {
	stack
		.iter()
		.take_while(|frame| frame.kind != FrameKind::Permission)
}

impl fmt::Display for PermissionCheck {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.kind {
			CheckKind::Role { role, target } => {
				write!(f, "RolePermissionCheck(role={role}, target={target})")
			}
			CheckKind::GlobalRole { role } => write!(f, "GlobalRolePermissionCheck(globalRole={role})"),
		}
	}
}
