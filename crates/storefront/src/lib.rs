//! Dreamy Layers storefront API library.
//!
//! The HTTP application is built by [`routes::app`] so the binary and the
//! integration tests serve exactly the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
