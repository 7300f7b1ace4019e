//! Dreamy Layers Core - Shared domain types.
//!
//! This crate provides the types used across all Dreamy Layers components:
//! - `storefront` - The public REST API (users, catalog, cart, wishlist, orders)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and the rules that govern them - no I/O,
//! no database access, no HTTP clients. Every persistence backend applies the
//! same cart, checkout and order-status rules by calling into this crate.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, money, cart lines, wishlist items, orders and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
