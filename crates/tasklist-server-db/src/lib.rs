// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Tasklist server.
//!
//! Repositories wrap a [`sqlx::SqlitePool`] and are exposed behind async
//! store traits so services can be tested against other implementations.

pub mod account;
pub mod error;
pub mod pool;
pub mod testing;

pub use account::{AccountRepository, AccountStore};
pub use error::{map_unique_violation, DbError, Result, UniqueConstraint};
pub use pool::{create_pool, run_migrations, PoolSettings};
