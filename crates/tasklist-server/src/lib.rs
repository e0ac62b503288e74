// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wiring for the `tasklist-server` operator binary.

pub mod commands;
pub mod identity;

pub use commands::{login, parse_attributes, whoami, CommandOutput};
pub use identity::normalizer_from_config;
