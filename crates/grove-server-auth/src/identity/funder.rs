// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External funders. They see their own account, funding entity, notifications
//! and uploads, and nothing inside organizations.

use async_trait::async_trait;
use std::sync::Arc;

use super::{make_full_name, UserIdentity};
use crate::error::IdentityError;
use crate::store::ParentStore;
use crate::types::{FundingEntityId, NotificationId, UploadId, UserId, UserType};

type Check = Result<bool, IdentityError>;

pub struct FunderUser {
	user_id: UserId,
	auth_id: Option<String>,
	email: String,
	first_name: Option<String>,
	last_name: Option<String>,
	funding_entity_id: Option<FundingEntityId>,
	parents: Arc<dyn ParentStore>,
}

impl FunderUser {
	pub fn new(
		user_id: UserId,
		auth_id: Option<String>,
		email: String,
		funding_entity_id: Option<FundingEntityId>,
		parents: Arc<dyn ParentStore>,
	) -> Self {
		Self {
			user_id,
			auth_id,
			email,
			first_name: None,
			last_name: None,
			funding_entity_id,
			parents,
		}
	}

	pub fn with_name(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
		self.first_name = first_name;
		self.last_name = last_name;
		self
	}

	pub fn email(&self) -> &str {
		&self.email
	}

	pub fn full_name(&self) -> Option<String> {
		make_full_name(self.first_name.as_deref(), self.last_name.as_deref())
	}

	fn owns(&self, owner: Option<UserId>) -> bool {
		owner == Some(self.user_id)
	}
}

#[async_trait]
impl UserIdentity for FunderUser {
	fn user_id(&self) -> UserId {
		self.user_id
	}

	fn user_type(&self) -> UserType {
		UserType::Funder
	}

	fn auth_id(&self) -> Option<&str> {
		self.auth_id.as_deref()
	}

	fn username(&self) -> String {
		self.email.clone()
	}

	fn funding_entity_id(&self) -> Option<FundingEntityId> {
		self.funding_entity_id
	}

	fn default_permission(&self) -> bool {
		false
	}

	async fn can_read_user(&self, user_id: &UserId) -> Check {
		Ok(*user_id == self.user_id)
	}

	async fn can_delete_self(&self) -> Check {
		Ok(true)
	}

	async fn can_read_funding_entity(&self, funding_entity_id: &FundingEntityId) -> Check {
		Ok(self.funding_entity_id == Some(*funding_entity_id))
	}

	async fn can_count_notifications(&self) -> Check {
		Ok(true)
	}

	async fn can_read_notification(&self, notification_id: &NotificationId) -> Check {
		let owner = self.parents.user_of_notification(notification_id).await?;
		Ok(self.owns(owner))
	}

	async fn can_update_notification(&self, notification_id: &NotificationId) -> Check {
		self.can_read_notification(notification_id).await
	}

	async fn can_read_upload(&self, upload_id: &UploadId) -> Check {
		let owner = self.parents.user_of_upload(upload_id).await?;
		Ok(self.owns(owner))
	}

	async fn can_update_upload(&self, upload_id: &UploadId) -> Check {
		self.can_read_upload(upload_id).await
	}

	async fn can_delete_upload(&self, upload_id: &UploadId) -> Check {
		self.can_read_upload(upload_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::InMemoryStore;
	use crate::types::{OrganizationId, Role};

	fn funder(store: &Arc<InMemoryStore>, entity: Option<FundingEntityId>) -> FunderUser {
		FunderUser::new(
			UserId::generate(),
			Some("funder|1".to_string()),
			"funder@example.com".to_string(),
			entity,
			store.clone(),
		)
	}

	#[tokio::test]
	async fn reads_only_its_own_funding_entity() {
		let store = Arc::new(InMemoryStore::default());
		let entity = FundingEntityId::generate();
		let user = funder(&store, Some(entity));

		assert!(user.can_read_funding_entity(&entity).await.unwrap());
		assert!(!user
			.can_read_funding_entity(&FundingEntityId::generate())
			.await
			.unwrap());
		assert!(!funder(&store, None).can_read_funding_entity(&entity).await.unwrap());
	}

	#[tokio::test]
	async fn owns_its_notifications_and_uploads() {
		let store = Arc::new(InMemoryStore::default());
		let user = funder(&store, None);
		let notification = store.add_notification(user.user_id());
		let upload = store.add_upload(user.user_id());
		let foreign_upload = store.add_upload(UserId::generate());

		assert!(user.can_count_notifications().await.unwrap());
		assert!(user.can_update_notification(&notification).await.unwrap());
		assert!(user.can_delete_upload(&upload).await.unwrap());
		assert!(!user.can_read_upload(&foreign_upload).await.unwrap());
	}

	#[tokio::test]
	async fn denies_organization_access_by_default() {
		let store = Arc::new(InMemoryStore::default());
		let organization = OrganizationId::generate();
		store.add_organization(organization);
		let user = funder(&store, None);
		store.add_member(user.user_id(), organization, Role::Owner);

		assert!(!user.can_read_organization(&organization).await.unwrap());
		assert!(!user.can_list_notifications(None).await.unwrap());
		assert!(user.organization_roles().await.unwrap().is_empty());
		assert!(user.can_read_user(&user.user_id()).await.unwrap());
		assert!(!user.can_read_user(&UserId::generate()).await.unwrap());
	}

	#[test]
	fn full_name_and_username() {
		let store = Arc::new(InMemoryStore::default());
		let user = funder(&store, None).with_name(Some("Grace".into()), Some("Hopper".into()));
		assert_eq!(user.full_name(), Some("Grace Hopper".to_string()));
		assert_eq!(user.username(), "funder@example.com");
	}
}
