// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission check recording and inversion detection.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::check::{CheckKind, PermissionCheck};
use crate::context::{lock, CallStack};

/// A stricter check that ran under a weaker, already-granted guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inversion {
	pub guard: PermissionCheck,
	pub check: PermissionCheck,
}

impl fmt::Display for Inversion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} is guarded only by {}\n  check stack:\n{}\n  guard stack:\n{}",
			self.check,
			self.guard,
			self.check.pretty_print_stack(),
			self.guard.pretty_print_stack()
		)
	}
}

/// Returned by [`CheckRecorder::assert_no_inversions`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} permission inversion(s) detected:\n{}", .inversions.len(), render(.inversions))]
pub struct InversionReport {
	pub inversions: Vec<Inversion>,
}

fn render(inversions: &[Inversion]) -> String {
	inversions
		.iter()
		.map(|i| i.to_string())
		.collect::<Vec<_>>()
		.join("\n")
}

fn is_inversion(guard: &PermissionCheck, check: &PermissionCheck) -> bool {
	guard.is_granted()
		&& check.is_guarded_by(guard)
		&& check.is_stricter_than(guard)
		&& !check.is_implied_by(guard)
}

/// Scan an ordered list of checks for inversions.
pub fn find_inversions(checks: &[PermissionCheck]) -> Vec<Inversion> {
	checks
		.iter()
		.enumerate()
		.flat_map(|(i, check)| {
			checks[..i]
				.iter()
				.filter(move |earlier| is_inversion(earlier, check))
				.map(move |earlier| Inversion {
					guard: earlier.clone(),
					check: check.clone(),
				})
		})
		.collect()
}

#[derive(Default)]
struct RecorderState {
	checks: Vec<PermissionCheck>,
	inversions: Vec<Inversion>,
}

/// Collects the permission checks evaluated during one request.
///
/// Each check is stamped with a snapshot of the request's [`CallStack`] and
/// compared against every earlier granted check as it arrives.
pub struct CheckRecorder {
	call_stack: Arc<CallStack>,
	state: Mutex<RecorderState>,
}

impl CheckRecorder {
	pub fn new(call_stack: Arc<CallStack>) -> Self {
		Self {
			call_stack,
			state: Mutex::new(RecorderState::default()),
		}
	}

	/// Record an evaluated check. Returns the stored record.
	pub fn record(&self, kind: CheckKind, granted: bool) -> PermissionCheck {
		let check = PermissionCheck::new(kind, granted).with_call_stack(self.call_stack.snapshot());

		let mut state = lock(&self.state);
		let found: Vec<Inversion> = state
			.checks
			.iter()
			.filter(|earlier| is_inversion(earlier, &check))
			.map(|earlier| Inversion {
				guard: earlier.clone(),
				check: check.clone(),
			})
			.collect();

		for inversion in &found {
			tracing::warn!(
				check = %inversion.check,
				guard = %inversion.guard,
				check_stack = %inversion.check.pretty_print_stack(),
				guard_stack = %inversion.guard.pretty_print_stack(),
				"permission inversion detected"
			);
		}

		state.inversions.extend(found);
		state.checks.push(check.clone());
		tracing::trace!(check = %check, granted, "permission check recorded");
		check
	}

	pub fn checks(&self) -> Vec<PermissionCheck> {
		lock(&self.state).checks.clone()
	}

	pub fn inversions(&self) -> Vec<Inversion> {
		lock(&self.state).inversions.clone()
	}

	pub fn assert_no_inversions(&self) -> Result<(), InversionReport> {
		let inversions = self.inversions();
		if inversions.is_empty() {
			Ok(())
		} else {
			Err(InversionReport { inversions })
		}
	}

	pub fn clear(&self) {
		let mut state = lock(&self.state);
		state.checks.clear();
		state.inversions.clear();
	}
}

impl fmt::Debug for CheckRecorder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = lock(&self.state);
		f.debug_struct("CheckRecorder")
			.field("checks", &state.checks.len())
			.field("inversions", &state.inversions.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::check::{CallFrame, FrameKind, TargetId};
	use crate::types::{FacilityId, GlobalRole, Role};

	fn role_check(role: Role, facility: FacilityId) -> CheckKind {
		CheckKind::Role {
			role,
			target: TargetId::Facility(facility),
		}
	}

	fn recorder() -> (Arc<CallStack>, CheckRecorder) {
		let stack = Arc::new(CallStack::default());
		let recorder = CheckRecorder::new(Arc::clone(&stack));
		(stack, recorder)
	}

	#[test]
	fn stricter_nested_check_is_an_inversion() {
		let (stack, recorder) = recorder();
		let facility = FacilityId::generate();

		let _handler = stack.push(CallFrame::application("AlertHandler", "on_alert"));
		recorder.record(role_check(Role::Contributor, facility), true);
		{
			let _nested = stack.push(CallFrame::application("FacilityService", "reset"));
			recorder.record(role_check(Role::Admin, facility), true);
		}

		let inversions = recorder.inversions();
		assert_eq!(inversions.len(), 1);
		assert!(inversions[0].check.is_guarded_by(&inversions[0].guard));
		assert!(!inversions[0].check.is_implied_by(&inversions[0].guard));
		assert!(recorder.assert_no_inversions().is_err());
	}

	#[test]
	fn weaker_nested_check_is_fine() {
		let (stack, recorder) = recorder();
		let facility = FacilityId::generate();

		let _handler = stack.push(CallFrame::application("AlertHandler", "on_alert"));
		recorder.record(role_check(Role::Admin, facility), true);
		let _nested = stack.push(CallFrame::application("FacilityService", "read"));
		recorder.record(role_check(Role::Contributor, facility), true);

		assert!(recorder.assert_no_inversions().is_ok());
		assert_eq!(recorder.checks().len(), 2);
	}

	#[test]
	fn denied_guard_does_not_count() {
		let (_stack, recorder) = recorder();
		let facility = FacilityId::generate();

		recorder.record(role_check(Role::Contributor, facility), false);
		recorder.record(role_check(Role::Admin, facility), true);

		assert!(recorder.inversions().is_empty());
	}

	#[test]
	fn frames_below_entry_point_are_not_captured() {
		let (stack, recorder) = recorder();
		let _outer = stack.push(CallFrame::application("Scheduler", "tick"));
		let _entry = stack.push(CallFrame::new("TestHarness", "run", FrameKind::EntryPoint));
		let _app = stack.push(CallFrame::application("Jobs", "sweep"));

		let check = recorder.record(CheckKind::GlobalRole { role: GlobalRole::ReadOnly }, true);
		let frames = check.call_stack().unwrap();
		assert_eq!(frames.len(), 1);
		assert_eq!(frames[0].operation, "sweep");
	}

	#[test]
	fn find_inversions_matches_live_detection() {
		let (stack, recorder) = recorder();
		let facility = FacilityId::generate();
		let _handler = stack.push(CallFrame::application("Handler", "run"));
		recorder.record(role_check(Role::Manager, facility), true);
		recorder.record(role_check(Role::Owner, facility), true);
		recorder.record(CheckKind::GlobalRole { role: GlobalRole::SuperAdmin }, true);

		assert_eq!(find_inversions(&recorder.checks()), recorder.inversions());
	}

	#[test]
	fn clear_resets_state() {
		let (_stack, recorder) = recorder();
		recorder.record(CheckKind::GlobalRole { role: GlobalRole::ReadOnly }, true);
		recorder.clear();
		assert!(recorder.checks().is_empty());
	}
}
