//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dreamy_layers_core::{ProductId, ProductSnapshot};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Copy the fields a cart or wishlist line keeps.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

/// Body for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewProduct {
    /// Check the name is present and the price is not negative.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(Some(&self.name), Some(self.price))
    }
}

/// Partial update for a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl ProductPatch {
    /// # Errors
    ///
    /// Returns a user-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(self.name.as_ref(), self.price)
    }

    /// Apply the patch to an in-memory product.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if self.image.is_some() {
            product.image = self.image;
        }
        if self.category.is_some() {
            product.category = self.category;
        }
    }
}

fn validate_fields(name: Option<&String>, price: Option<Decimal>) -> Result<(), String> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err("Product name is required".to_string());
    }
    if price.is_some_and(|p| p < Decimal::ZERO) {
        return Err("Price must not be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Decimal::from(price),
            description: String::new(),
            image: None,
            category: None,
        }
    }

    #[test]
    fn test_new_product_validation() {
        assert!(new_product("Red Velvet", 450).validate().is_ok());
        assert!(new_product("   ", 450).validate().is_err());
        assert!(new_product("Red Velvet", -1).validate().is_err());
    }

    #[test]
    fn test_patch_leaves_absent_fields() {
        let now = Utc::now();
        let mut product = Product {
            id: ProductId::new(1),
            name: "Eclair".to_string(),
            price: Decimal::from(90),
            description: "Choux".to_string(),
            image: Some("e.jpg".to_string()),
            category: None,
            created_at: now,
            updated_at: now,
        };

        ProductPatch {
            price: Some(Decimal::from(110)),
            ..ProductPatch::default()
        }
        .apply(&mut product);

        assert_eq!(product.price, Decimal::from(110));
        assert_eq!(product.name, "Eclair");
        assert_eq!(product.image.as_deref(), Some("e.jpg"));
    }
}
