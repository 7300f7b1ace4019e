//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login, and admin account management
//! - `products` - Catalog CRUD with cached reads
//! - `cart` - Per-user cart operations
//! - `wishlist` - Per-user wishlist operations
//! - `orders` - Checkout and order status transitions
//! - `payment` - Razorpay payment-order creation
//!
//! Services borrow the shared [`crate::db::Repositories`] for the duration of
//! a request.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payment;
pub mod products;
pub mod wishlist;
