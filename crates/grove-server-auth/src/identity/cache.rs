// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-identity cache of resolved role maps.
//!
//! Each map is loaded from the [`PermissionStore`] on first access and kept
//! until it is invalidated. Loading and invalidation take the same lock, so a
//! read never observes a half-reset map.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{
	FacilityRoles, GlobalRoles, OrganizationRoles, PermissionStore, ProjectRoles, SiteRoles,
};
use crate::types::UserId;

struct CacheCell<T> {
	value: Mutex<Option<Arc<T>>>,
}

impl<T> Default for CacheCell<T> {
	fn default() -> Self {
		Self {
			value: Mutex::new(None),
		}
	}
}

impl<T> CacheCell<T> {
	async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>, StoreError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, StoreError>>,
	{
		let mut slot = self.value.lock().await;
		if let Some(value) = slot.as_ref() {
			return Ok(Arc::clone(value));
		}
		let loaded = Arc::new(load().await?);
		*slot = Some(Arc::clone(&loaded));
		Ok(loaded)
	}

	async fn invalidate(&self) {
		*self.value.lock().await = None;
	}

	async fn is_loaded(&self) -> bool {
		self.value.lock().await.is_some()
	}
}

/// Lazily computed, explicitly resettable role maps for one user.
pub struct RoleCache {
	user_id: UserId,
	store: Arc<dyn PermissionStore>,
	organization: CacheCell<OrganizationRoles>,
	project: CacheCell<ProjectRoles>,
	site: CacheCell<SiteRoles>,
	facility: CacheCell<FacilityRoles>,
	global: CacheCell<GlobalRoles>,
}

impl RoleCache {
	pub fn new(user_id: UserId, store: Arc<dyn PermissionStore>) -> Self {
		Self {
			user_id,
			store,
			organization: CacheCell::default(),
			project: CacheCell::default(),
			site: CacheCell::default(),
			facility: CacheCell::default(),
			global: CacheCell::default(),
		}
	}

	pub async fn organization_roles(&self) -> Result<Arc<OrganizationRoles>, StoreError> {
		self.organization
			.get_or_load(|| self.store.fetch_organization_roles(&self.user_id))
			.await
	}

	pub async fn project_roles(&self) -> Result<Arc<ProjectRoles>, StoreError> {
		self.project
			.get_or_load(|| self.store.fetch_project_roles(&self.user_id))
			.await
	}

	pub async fn site_roles(&self) -> Result<Arc<SiteRoles>, StoreError> {
		self.site
			.get_or_load(|| self.store.fetch_site_roles(&self.user_id))
			.await
	}

	pub async fn facility_roles(&self) -> Result<Arc<FacilityRoles>, StoreError> {
		self.facility
			.get_or_load(|| self.store.fetch_facility_roles(&self.user_id))
			.await
	}

	pub async fn global_roles(&self) -> Result<Arc<GlobalRoles>, StoreError> {
		self.global
			.get_or_load(|| self.store.fetch_global_roles(&self.user_id))
			.await
	}

	pub async fn invalidate_organization_roles(&self) {
		self.organization.invalidate().await;
	}

	pub async fn invalidate_project_roles(&self) {
		self.project.invalidate().await;
	}

	pub async fn invalidate_site_roles(&self) {
		self.site.invalidate().await;
	}

	pub async fn invalidate_facility_roles(&self) {
		self.facility.invalidate().await;
	}

	pub async fn invalidate_global_roles(&self) {
		self.global.invalidate().await;
	}

	/// Drop every cached map.
	pub async fn clear(&self) {
		self.organization.invalidate().await;
		self.project.invalidate().await;
		self.site.invalidate().await;
		self.facility.invalidate().await;
		self.global.invalidate().await;
		tracing::debug!(user_id = %self.user_id, "cached role maps cleared");
	}

	pub async fn is_organization_roles_loaded(&self) -> bool {
		self.organization.is_loaded().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::InMemoryStore;
	use crate::types::{OrganizationId, Role};

	#[tokio::test]
	async fn loads_once_until_invalidated() {
		let store = Arc::new(InMemoryStore::default());
		let user = UserId::generate();
		let org = OrganizationId::generate();
		store.add_organization(org);
		store.add_member(user, org, Role::Manager);

		let cache = RoleCache::new(user, store.clone());
		assert!(!cache.is_organization_roles_loaded().await);

		let first = cache.organization_roles().await.unwrap();
		assert_eq!(first.get(&org), Some(&Role::Manager));
		assert_eq!(store.fetch_count(), 1);

		cache.organization_roles().await.unwrap();
		assert_eq!(store.fetch_count(), 1);

		store.add_member(user, org, Role::Owner);
		assert_eq!(
			cache.organization_roles().await.unwrap().get(&org),
			Some(&Role::Manager)
		);

		cache.invalidate_organization_roles().await;
		assert_eq!(
			cache.organization_roles().await.unwrap().get(&org),
			Some(&Role::Owner)
		);
		assert_eq!(store.fetch_count(), 2);
	}

	#[tokio::test]
	async fn maps_are_invalidated_independently() {
		let store = Arc::new(InMemoryStore::default());
		let user = UserId::generate();
		let cache = RoleCache::new(user, store.clone());

		cache.organization_roles().await.unwrap();
		cache.facility_roles().await.unwrap();
		assert_eq!(store.fetch_count(), 2);

		cache.invalidate_facility_roles().await;
		cache.organization_roles().await.unwrap();
		cache.facility_roles().await.unwrap();
		assert_eq!(store.fetch_count(), 3);

		cache.clear().await;
		assert!(!cache.is_organization_roles_loaded().await);
	}

	#[tokio::test]
	async fn store_failure_leaves_cell_empty() {
		let store = Arc::new(InMemoryStore::default());
		let cache = RoleCache::new(UserId::generate(), store.clone());

		store.fail_next_fetch();
		assert!(cache.organization_roles().await.is_err());
		assert!(!cache.is_organization_roles_loaded().await);
		assert!(cache.organization_roles().await.is_ok());
	}
}
