// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account and provider identity types for the Tasklist server.
//!
//! Turning a provider login into a local account happens in two steps. This
//! crate owns the first: [`IdentityNormalizer`] maps the raw attribute bag an
//! OAuth2 provider returns onto a [`CanonicalIdentity`]. The second step,
//! resolving that identity against the account store, lives in
//! `tasklist-server-provisioning`.

pub mod account;
pub mod identity;
pub mod normalize;
pub mod types;

pub use account::{Account, AccountProfile, NewAccount};
pub use identity::{attribute_text, CanonicalIdentity, IdentityError, ProviderAttributes};
pub use normalize::{normalize, AttributeMapping, EmailSource, IdentityNormalizer, NameSource};
pub use types::{AccountId, ProviderKey};
