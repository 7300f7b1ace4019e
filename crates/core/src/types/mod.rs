//! Core types for Dreamy Layers.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod status;
pub mod wishlist;

pub use cart::{CartLines, LineItem, ProductSnapshot};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{CheckoutError, CheckoutRequest, NewOrder, Order, PaymentMethod, ShippingDetails};
pub use price::{CurrencyCode, PriceError, to_minor_units};
pub use status::*;
pub use wishlist::WishlistItems;
