// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Grove permission core.
//!
//! - [`PermissionRepository`] resolves effective roles and implements
//!   [`grove_server_auth::PermissionStore`].
//! - [`ParentRepository`] answers containment lookups and implements
//!   [`grove_server_auth::ParentStore`].
//! - [`UserRepository`] loads identities and registers first-time users.

pub mod error;
pub mod migrations;
pub mod parent;
mod parse;
pub mod permission;
pub mod pool;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use parent::ParentRepository;
pub use permission::PermissionRepository;
pub use pool::create_pool;
pub use user::UserRepository;
