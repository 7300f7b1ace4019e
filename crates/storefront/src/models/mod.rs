//! Domain models for the storefront API.
//!
//! Cart, wishlist and order types live in `dreamy_layers_core`; the types
//! here are the ones only the server needs.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{CustomerSummary, OrderWithCustomer};
pub use product::{NewProduct, Product, ProductPatch};
pub use session::CurrentUser;
pub use user::{NewUser, User, UserCredentials};
