// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission check recording.

use serde::Deserialize;

/// Permission configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct PermissionsConfig {
	/// Record every permission check made during a request and report
	/// inversions when it ends. Off in production.
	pub record_checks: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsConfigLayer {
	#[serde(default)]
	pub record_checks: Option<bool>,
}

impl PermissionsConfigLayer {
	pub fn merge(&mut self, other: PermissionsConfigLayer) {
		if other.record_checks.is_some() {
			self.record_checks = other.record_checks;
		}
	}

	pub fn finalize(self) -> PermissionsConfig {
		PermissionsConfig {
			record_checks: self.record_checks.unwrap_or(false),
		}
	}
}
