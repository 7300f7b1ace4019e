//! Order views for admin listings.

use serde::Serialize;

use dreamy_layers_core::{Email, Order, UserId};

/// The customer fields shown next to an order in admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// An order with its customer's name and email attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerSummary>,
}
