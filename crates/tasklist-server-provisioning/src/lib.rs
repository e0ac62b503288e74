// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account provisioning from provider logins.
//!
//! [`AccountProvisioner::login`] is the single call the HTTP layer makes once
//! an OAuth2 handshake completes: it normalizes the provider's attributes and
//! resolves them to a local account, creating or updating it as needed.
//! Identity collisions are reported as typed [`ProvisioningError`]s; mapping
//! them to status codes is left to the caller.

pub mod error;
pub mod provisioner;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use error::ProvisioningError;
pub use provisioner::AccountProvisioner;
pub use resolver::{AccountResolver, Resolution};
