// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective-role report for a single user.

use grove_server_auth::{IdentityError, Role, UserId, UserIdentity, UserType};
use grove_server_db::{DbError, UserRepository};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
	#[error("User {0} not found")]
	UnknownUser(UserId),

	#[error(transparent)]
	Db(#[from] DbError),

	#[error(transparent)]
	Identity(#[from] IdentityError),
}

#[derive(Debug, Serialize)]
pub struct RoleReport {
	pub user_id: UserId,
	pub user_type: UserType,
	pub organizations: BTreeMap<String, Role>,
	pub projects: BTreeMap<String, Role>,
	pub sites: BTreeMap<String, Role>,
	pub facilities: BTreeMap<String, Role>,
	pub global_roles: Vec<String>,
}

fn sorted<K: Display>(roles: &HashMap<K, Role>) -> BTreeMap<String, Role> {
	roles.iter().map(|(id, role)| (id.to_string(), *role)).collect()
}

/// Resolve every role map for the user. System identities have no role maps
/// and fail with [`IdentityError::Unsupported`].
pub async fn role_report(users: &UserRepository, user_id: &UserId) -> Result<RoleReport, ReportError> {
	let user = users
		.fetch_by_id(user_id)
		.await?
		.ok_or(ReportError::UnknownUser(*user_id))?;

	let mut global_roles: Vec<String> = user
		.global_roles()
		.await?
		.iter()
		.map(ToString::to_string)
		.collect();
	global_roles.sort();

	Ok(RoleReport {
		user_id: user.user_id(),
		user_type: user.user_type(),
		organizations: sorted(&*user.organization_roles().await?),
		projects: sorted(&*user.project_roles().await?),
		sites: sorted(&*user.site_roles().await?),
		facilities: sorted(&*user.facility_roles().await?),
		global_roles,
	})
}
