// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

pub mod database;
pub mod identity;
pub mod logging;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use identity::{IdentityConfig, IdentityConfigLayer, ProviderMappingConfig};
pub use logging::{LoggingConfig, LoggingConfigLayer};
