// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scoped context.
//!
//! A [`RequestContext`] carries the identity acting for one logical operation,
//! the explicit call stack used to attribute permission checks, and an optional
//! [`CheckRecorder`]. It is passed by reference to every operation that needs it;
//! nothing here is global.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::check::{CallFrame, FrameKind};
use crate::identity::UserIdentity;
use crate::recorder::CheckRecorder;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Call stack
// =============================================================================

/// Explicitly maintained stack of call frames, outermost first.
#[derive(Debug, Default)]
pub struct CallStack {
	frames: Mutex<Vec<CallFrame>>,
}

impl CallStack {
	/// Push a frame. It is popped, along with anything pushed after it, when
	/// the returned guard is dropped.
	pub fn push(&self, frame: CallFrame) -> FrameGuard<'_> {
		let mut frames = lock(&self.frames);
		let depth = frames.len();
		frames.push(frame);
		FrameGuard { stack: self, depth }
	}

	pub fn depth(&self) -> usize {
		lock(&self.frames).len()
	}

	/// Frames above the innermost entry point.
	pub fn snapshot(&self) -> Vec<CallFrame> {
		let frames = lock(&self.frames);
		let start = frames
			.iter()
			.rposition(|frame| frame.kind == FrameKind::EntryPoint)
			.map_or(0, |i| i + 1);
		frames[start..].to_vec()
	}
}

/// Pops its frame from the [`CallStack`] on drop.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard<'a> {
	stack: &'a CallStack,
	depth: usize,
}

impl Drop for FrameGuard<'_> {
	fn drop(&mut self) {
		lock(&self.stack.frames).truncate(self.depth);
	}
}

// =============================================================================
// Request context
// =============================================================================

pub struct RequestContext {
	current: Mutex<Arc<dyn UserIdentity>>,
	call_stack: Arc<CallStack>,
	recorder: Option<Arc<CheckRecorder>>,
}

impl RequestContext {
	pub fn new(user: Arc<dyn UserIdentity>) -> Self {
		Self {
			current: Mutex::new(user),
			call_stack: Arc::new(CallStack::default()),
			recorder: None,
		}
	}

	/// Enable permission check recording for this context.
	pub fn with_recording(mut self) -> Self {
		self.recorder = Some(Arc::new(CheckRecorder::new(Arc::clone(&self.call_stack))));
		self
	}

	/// Enable recording if `enabled` is true; used with the
	/// `permissions.record_checks` setting.
	pub fn recording(self, enabled: bool) -> Self {
		if enabled {
			self.with_recording()
		} else {
			self
		}
	}

	/// The identity currently acting in this context.
	pub fn current_user(&self) -> Arc<dyn UserIdentity> {
		Arc::clone(&lock(&self.current))
	}

	pub fn call_stack(&self) -> &CallStack {
		&self.call_stack
	}

	pub fn recorder(&self) -> Option<&Arc<CheckRecorder>> {
		self.recorder.as_ref()
	}

	/// Mark entry into an application function.
	pub fn enter(&self, component: &'static str, operation: &'static str) -> FrameGuard<'_> {
		self.call_stack
			.push(CallFrame::new(component, operation, FrameKind::Application))
	}

	/// Mark a request handler or test harness boundary.
	pub fn enter_entry_point(
		&self,
		component: &'static str,
		operation: &'static str,
	) -> FrameGuard<'_> {
		self.call_stack
			.push(CallFrame::new(component, operation, FrameKind::EntryPoint))
	}

	pub(crate) fn enter_permission(&self, operation: &'static str) -> FrameGuard<'_> {
		self.call_stack.push(CallFrame::new(
			"PermissionRequirements",
			operation,
			FrameKind::Permission,
		))
	}

	/// Run `operation` with `user` as the current identity.
	///
	/// The previous identity is restored however `operation` ends, including
	/// by panic or by the returned future being dropped. Calls may nest.
	pub async fn run_as<F>(&self, user: Arc<dyn UserIdentity>, operation: F) -> F::Output
	where
		F: Future,
	{
		tracing::debug!(
			user_id = %user.user_id(),
			user_type = %user.user_type(),
			"running as identity"
		);
		let previous = std::mem::replace(&mut *lock(&self.current), user);
		let _restore = RestoreIdentity {
			slot: &self.current,
			previous: Some(previous),
		};
		operation.await
	}
}

struct RestoreIdentity<'a> {
	slot: &'a Mutex<Arc<dyn UserIdentity>>,
	previous: Option<Arc<dyn UserIdentity>>,
}

impl Drop for RestoreIdentity<'_> {
	fn drop(&mut self) {
		if let Some(previous) = self.previous.take() {
			*lock(self.slot) = previous;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::identity::SystemUser;
	use crate::testing::{individual, InMemoryStore};
	use crate::types::UserId;
	use futures::FutureExt;
	use std::panic::AssertUnwindSafe;

	fn context() -> (RequestContext, UserId) {
		let store = Arc::new(InMemoryStore::default());
		let user = individual(&store);
		let user_id = user.user_id();
		(RequestContext::new(user), user_id)
	}

	mod run_as {
		use super::*;

		#[tokio::test]
		async fn swaps_and_restores_identity() {
			let (ctx, original) = context();
			let system: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));
			let system_id = system.user_id();

			let seen = ctx.run_as(system, async { ctx.current_user().user_id() }).await;

			assert_eq!(seen, system_id);
			assert_eq!(ctx.current_user().user_id(), original);
		}

		#[tokio::test]
		async fn restores_after_error() {
			let (ctx, original) = context();
			let system: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));

			let result: Result<(), &str> = ctx.run_as(system, async { Err("boom") }).await;

			assert!(result.is_err());
			assert_eq!(ctx.current_user().user_id(), original);
		}

		#[tokio::test]
		async fn restores_after_panic() {
			let (ctx, original) = context();
			let system: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));

			let fail = true;
			let outcome = AssertUnwindSafe(ctx.run_as(system, async move {
				if fail {
					panic!("operation failed");
				}
			}))
			.catch_unwind()
			.await;

			assert!(outcome.is_err());
			assert_eq!(ctx.current_user().user_id(), original);
		}

		#[tokio::test]
		async fn restores_when_cancelled() {
			let (ctx, original) = context();
			let system: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));
			let system_id = system.user_id();

			{
				let mut pending = Box::pin(ctx.run_as(system, futures::future::pending::<()>()));
				assert!(futures::poll!(pending.as_mut()).is_pending());
				assert_eq!(ctx.current_user().user_id(), system_id);
			}

			assert_eq!(ctx.current_user().user_id(), original);
		}

		#[tokio::test]
		async fn nests_reentrantly() {
			let (ctx, original) = context();
			let outer: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));
			let inner: Arc<dyn UserIdentity> = Arc::new(SystemUser::new(UserId::generate()));
			let (outer_id, inner_id) = (outer.user_id(), inner.user_id());

			let observed = ctx
				.run_as(outer, async {
					let nested = ctx.run_as(inner, async { ctx.current_user().user_id() }).await;
					(nested, ctx.current_user().user_id())
				})
				.await;

			assert_eq!(observed, (inner_id, outer_id));
			assert_eq!(ctx.current_user().user_id(), original);
		}
	}

	mod call_stack {
		use super::*;

		#[test]
		fn guards_pop_frames() {
			let (ctx, _) = context();
			{
				let _outer = ctx.enter("Service", "outer");
				let _inner = ctx.enter("Service", "inner");
				assert_eq!(ctx.call_stack().depth(), 2);
			}
			assert_eq!(ctx.call_stack().depth(), 0);
		}

		#[test]
		fn snapshot_starts_after_entry_point() {
			let (ctx, _) = context();
			let _framework = ctx.enter("Router", "dispatch");
			let _entry = ctx.enter_entry_point("FacilitiesController", "delete");
			let _service = ctx.enter("FacilityService", "delete");

			let snapshot = ctx.call_stack().snapshot();
			assert_eq!(snapshot, vec![CallFrame::application("FacilityService", "delete")]);
		}

		#[test]
		fn recording_is_opt_in() {
			let (ctx, _) = context();
			assert!(ctx.recorder().is_none());
			let ctx = ctx.recording(true);
			assert!(ctx.recorder().is_some());
		}
	}
}
