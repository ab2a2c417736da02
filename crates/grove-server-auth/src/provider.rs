// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider lookups.
//!
//! Sign-in and token handling live with the external identity provider. The
//! permission core only needs to turn a provider-issued subject ID into profile
//! fields the first time a user is seen.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Profile fields returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	pub auth_id: String,
	pub email: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Returns `Ok(None)` if the provider has no user with this ID.
	async fn fetch_profile(&self, auth_id: &str) -> Result<Option<ProviderProfile>, StoreError>;
}
