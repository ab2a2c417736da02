// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stores for identity and requirements tests.
//!
//! [`InMemoryStore`] implements both [`PermissionStore`] and [`ParentStore`] and
//! widens project, site and facility access the same way the SQLite resolver
//! does.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::context::lock;
use crate::error::StoreError;
use crate::identity::{IndividualUser, UserProfile};
use crate::store::{
	FacilityRoles, GlobalRoles, OrganizationRoles, ParentStore, PermissionStore, ProjectRoles,
	SiteRoles,
};
use crate::types::{
	AccessionId, AutomationId, DeviceId, DeviceManagerId, FacilityId, GlobalRole, NotificationId,
	OrganizationId, ProjectId, Role, SiteId, SpeciesId, StorageLocationId, UploadId, UserId,
	UserType,
};

#[derive(Default)]
struct State {
	organizations: HashSet<OrganizationId>,
	members: HashMap<(UserId, OrganizationId), Role>,
	projects: HashMap<ProjectId, (OrganizationId, bool)>,
	project_users: HashSet<(ProjectId, UserId)>,
	sites: HashMap<SiteId, ProjectId>,
	facilities: HashMap<FacilityId, SiteId>,
	api_clients: HashSet<UserId>,
	global_roles: HashMap<UserId, HashSet<GlobalRole>>,
	accessions: HashMap<AccessionId, FacilityId>,
	automations: HashMap<AutomationId, FacilityId>,
	devices: HashMap<DeviceId, FacilityId>,
	device_managers: HashMap<DeviceManagerId, FacilityId>,
	device_manager_users: HashMap<UserId, DeviceManagerId>,
	storage_locations: HashMap<StorageLocationId, FacilityId>,
	species: HashMap<SpeciesId, OrganizationId>,
	notifications: HashMap<NotificationId, UserId>,
	uploads: HashMap<UploadId, UserId>,
}

impl State {
	/// Projects the user can reach, with their organization role.
	fn reachable_projects(&self, user_id: &UserId) -> HashMap<ProjectId, Role> {
		let is_api_client = self.api_clients.contains(user_id);
		self.projects
			.iter()
			.filter_map(|(project_id, (organization_id, organization_wide))| {
				let role = *self.members.get(&(*user_id, *organization_id))?;
				let visible = role.is_admin_or_higher()
					|| *organization_wide
					|| is_api_client
					|| self.project_users.contains(&(*project_id, *user_id));
				visible.then_some((*project_id, role))
			})
			.collect()
	}

	fn reachable_sites(&self, user_id: &UserId) -> HashMap<SiteId, Role> {
		let projects = self.reachable_projects(user_id);
		self.sites
			.iter()
			.filter_map(|(site_id, project_id)| Some((*site_id, *projects.get(project_id)?)))
			.collect()
	}
}

#[derive(Default)]
pub struct InMemoryStore {
	state: Mutex<State>,
	fetches: AtomicUsize,
	fail_next: AtomicBool,
}

impl InMemoryStore {
	pub fn add_organization(&self, organization_id: OrganizationId) {
		lock(&self.state).organizations.insert(organization_id);
	}

	/// Add or replace the user's role in an organization.
	pub fn add_member(&self, user_id: UserId, organization_id: OrganizationId, role: Role) {
		lock(&self.state)
			.members
			.insert((user_id, organization_id), role);
	}

	pub fn add_project(&self, organization_id: OrganizationId, organization_wide: bool) -> ProjectId {
		let id = ProjectId::generate();
		lock(&self.state)
			.projects
			.insert(id, (organization_id, organization_wide));
		id
	}

	pub fn add_project_user(&self, project_id: ProjectId, user_id: UserId) {
		lock(&self.state).project_users.insert((project_id, user_id));
	}

	pub fn add_site(&self, project_id: ProjectId) -> SiteId {
		let id = SiteId::generate();
		lock(&self.state).sites.insert(id, project_id);
		id
	}

	pub fn add_facility(&self, site_id: SiteId) -> FacilityId {
		let id = FacilityId::generate();
		lock(&self.state).facilities.insert(id, site_id);
		id
	}

	pub fn add_accession(&self, facility_id: FacilityId) -> AccessionId {
		let id = AccessionId::generate();
		lock(&self.state).accessions.insert(id, facility_id);
		id
	}

	pub fn add_automation(&self, facility_id: FacilityId) -> AutomationId {
		let id = AutomationId::generate();
		lock(&self.state).automations.insert(id, facility_id);
		id
	}

	pub fn add_device(&self, facility_id: FacilityId) -> DeviceId {
		let id = DeviceId::generate();
		lock(&self.state).devices.insert(id, facility_id);
		id
	}

	pub fn add_device_manager(&self, facility_id: FacilityId) -> DeviceManagerId {
		let id = DeviceManagerId::generate();
		lock(&self.state).device_managers.insert(id, facility_id);
		id
	}

	pub fn bind_device_manager(&self, user_id: UserId, device_manager_id: DeviceManagerId) {
		lock(&self.state)
			.device_manager_users
			.insert(user_id, device_manager_id);
	}

	pub fn add_storage_location(&self, facility_id: FacilityId) -> StorageLocationId {
		let id = StorageLocationId::generate();
		lock(&self.state).storage_locations.insert(id, facility_id);
		id
	}

	pub fn add_species(&self, organization_id: OrganizationId) -> SpeciesId {
		let id = SpeciesId::generate();
		lock(&self.state).species.insert(id, organization_id);
		id
	}

	pub fn add_notification(&self, user_id: UserId) -> NotificationId {
		let id = NotificationId::generate();
		lock(&self.state).notifications.insert(id, user_id);
		id
	}

	pub fn add_upload(&self, user_id: UserId) -> UploadId {
		let id = UploadId::generate();
		lock(&self.state).uploads.insert(id, user_id);
		id
	}

	pub fn set_api_client(&self, user_id: UserId) {
		lock(&self.state).api_clients.insert(user_id);
	}

	pub fn grant_global_role(&self, user_id: UserId, role: GlobalRole) {
		lock(&self.state)
			.global_roles
			.entry(user_id)
			.or_default()
			.insert(role);
	}

	/// Number of role-map fetches served so far.
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}

	/// Make the next role-map fetch fail.
	pub fn fail_next_fetch(&self) {
		self.fail_next.store(true, Ordering::SeqCst);
	}

	fn begin_fetch(&self) -> Result<(), StoreError> {
		if self.fail_next.swap(false, Ordering::SeqCst) {
			return Err(StoreError::msg("simulated store failure"));
		}
		self.fetches.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[async_trait]
impl PermissionStore for InMemoryStore {
	async fn fetch_organization_roles(
		&self,
		user_id: &UserId,
	) -> Result<OrganizationRoles, StoreError> {
		self.begin_fetch()?;
		let state = lock(&self.state);
		Ok(state
			.members
			.iter()
			.filter(|((member, _), _)| member == user_id)
			.map(|((_, organization_id), role)| (*organization_id, *role))
			.collect())
	}

	async fn fetch_project_roles(&self, user_id: &UserId) -> Result<ProjectRoles, StoreError> {
		self.begin_fetch()?;
		Ok(lock(&self.state).reachable_projects(user_id))
	}

	async fn fetch_site_roles(&self, user_id: &UserId) -> Result<SiteRoles, StoreError> {
		self.begin_fetch()?;
		Ok(lock(&self.state).reachable_sites(user_id))
	}

	async fn fetch_facility_roles(&self, user_id: &UserId) -> Result<FacilityRoles, StoreError> {
		self.begin_fetch()?;
		let state = lock(&self.state);
		let sites = state.reachable_sites(user_id);
		Ok(state
			.facilities
			.iter()
			.filter_map(|(facility_id, site_id)| Some((*facility_id, *sites.get(site_id)?)))
			.collect())
	}

	async fn fetch_global_roles(&self, user_id: &UserId) -> Result<GlobalRoles, StoreError> {
		self.begin_fetch()?;
		Ok(lock(&self.state)
			.global_roles
			.get(user_id)
			.cloned()
			.unwrap_or_default())
	}
}

#[async_trait]
impl ParentStore for InMemoryStore {
	async fn site_of_facility(&self, facility_id: &FacilityId) -> Result<Option<SiteId>, StoreError> {
		Ok(lock(&self.state).facilities.get(facility_id).copied())
	}

	async fn organization_of_facility(
		&self,
		facility_id: &FacilityId,
	) -> Result<Option<OrganizationId>, StoreError> {
		let state = lock(&self.state);
		Ok(state
			.facilities
			.get(facility_id)
			.and_then(|site_id| state.sites.get(site_id))
			.and_then(|project_id| state.projects.get(project_id))
			.map(|(organization_id, _)| *organization_id))
	}

	async fn facility_of_accession(
		&self,
		accession_id: &AccessionId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(lock(&self.state).accessions.get(accession_id).copied())
	}

	async fn facility_of_automation(
		&self,
		automation_id: &AutomationId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(lock(&self.state).automations.get(automation_id).copied())
	}

	async fn facility_of_device(&self, device_id: &DeviceId) -> Result<Option<FacilityId>, StoreError> {
		Ok(lock(&self.state).devices.get(device_id).copied())
	}

	async fn facility_of_device_manager(
		&self,
		device_manager_id: &DeviceManagerId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(lock(&self.state).device_managers.get(device_manager_id).copied())
	}

	async fn facility_of_storage_location(
		&self,
		storage_location_id: &StorageLocationId,
	) -> Result<Option<FacilityId>, StoreError> {
		Ok(lock(&self.state)
			.storage_locations
			.get(storage_location_id)
			.copied())
	}

	async fn organization_of_species(
		&self,
		species_id: &SpeciesId,
	) -> Result<Option<OrganizationId>, StoreError> {
		Ok(lock(&self.state).species.get(species_id).copied())
	}

	async fn user_of_notification(
		&self,
		notification_id: &NotificationId,
	) -> Result<Option<UserId>, StoreError> {
		Ok(lock(&self.state).notifications.get(notification_id).copied())
	}

	async fn user_of_upload(&self, upload_id: &UploadId) -> Result<Option<UserId>, StoreError> {
		Ok(lock(&self.state).uploads.get(upload_id).copied())
	}

	async fn device_manager_of_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<DeviceManagerId>, StoreError> {
		Ok(lock(&self.state).device_manager_users.get(user_id).copied())
	}
}

/// Build an ordinary user backed by `store`.
pub fn individual_with_id(store: &Arc<InMemoryStore>, user_id: UserId) -> Arc<IndividualUser> {
	let profile = UserProfile {
		user_id,
		auth_id: Some(format!("auth|{user_id}")),
		email: format!("{user_id}@example.com"),
		first_name: None,
		last_name: None,
		user_type: UserType::Individual,
	};
	Arc::new(IndividualUser::new(profile, store.clone(), store.clone()))
}

pub fn individual(store: &Arc<InMemoryStore>) -> Arc<IndividualUser> {
	individual_with_id(store, UserId::generate())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn widening_mirrors_the_resolver() {
		let store = InMemoryStore::default();
		let (admin, contributor, client) = (UserId::generate(), UserId::generate(), UserId::generate());
		let organization = OrganizationId::generate();
		store.add_organization(organization);
		store.add_member(admin, organization, Role::Admin);
		store.add_member(contributor, organization, Role::Contributor);
		store.add_member(client, organization, Role::Contributor);
		store.set_api_client(client);
		let private = store.add_project(organization, false);
		let shared = store.add_project(organization, true);

		let admin_projects = store.fetch_project_roles(&admin).await.unwrap();
		assert_eq!(admin_projects.get(&private), Some(&Role::Admin));

		let contributor_projects = store.fetch_project_roles(&contributor).await.unwrap();
		assert!(!contributor_projects.contains_key(&private));
		assert_eq!(contributor_projects.get(&shared), Some(&Role::Contributor));

		let client_projects = store.fetch_project_roles(&client).await.unwrap();
		assert!(client_projects.contains_key(&private));
	}
}
